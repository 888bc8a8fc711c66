use crate::*;

pub fn handle_runtime_commands(cli: &Cli, config: &ConfigFile) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Run {
            input,
            output,
            run_id,
            force,
        } => {
            let ledger_path = resolve_ledger_path(cli.ledger.as_deref(), config, output);
            let opts = RunOptions {
                run_id: run_id.clone(),
                overwrite: *force || config.general.overwrite_runs,
            };
            let summary = run_file(input, output, &ledger_path, &opts)?;
            print_one(cli.json, summary, |s| {
                let mut line = format!(
                    "{}\t{}\tHCI {}\tEVID {} (raw {})\tinferred {}\t{}",
                    s.report_id,
                    s.certification_level,
                    s.hci,
                    s.evid_effective,
                    s.evid_raw,
                    s.inferred_ratio,
                    s.run_dir
                );
                if !s.flags.is_empty() {
                    line.push_str(&format!("\tflags {}", s.flags.join(",")));
                }
                line
            })?;
        }
        Commands::Score { input } => {
            let report = load_report(input)?;
            let scored = score_report(&report)?;
            print_one(cli.json, scored, |s| {
                let mut out = format!(
                    "{}\t{}\tHCI {}\tEVID {} (raw {})\tinferred {}\trule {}",
                    s.title,
                    s.certification_level,
                    s.hci,
                    s.evid_effective,
                    s.evid_raw,
                    s.inferred_ratio,
                    s.matched_rule
                );
                if let Some(note) = &s.evid_ceiling_applied {
                    out.push_str(&format!("\n{}", note));
                }
                for f in &s.flags {
                    out.push_str(&format!("\nflag: {}", f));
                }
                out
            })?;
        }
        Commands::Batch {
            inputs,
            output,
            force,
        } => {
            let ledger_path = resolve_batch_ledger_path(cli.ledger.as_deref(), config, output);
            let summary = run_batch(
                inputs,
                output,
                &ledger_path,
                *force || config.general.overwrite_runs,
            )?;
            print_one(cli.json, summary, |s| {
                let mut out = format!(
                    "batch complete: {} runs\tavg HCI {}\tavg EVID_effective {}\tavg inferred {}",
                    s.total_runs,
                    opt_num(s.avg_hci),
                    opt_num(s.avg_evid_effective),
                    opt_num(s.avg_inferred_ratio)
                );
                let levels = CertificationLevel::ALL
                    .iter()
                    .map(|l| l.as_str())
                    .chain([ERROR_LEVEL]);
                for level in levels {
                    if let Some(n) = s.counts_by_level.get(level) {
                        out.push_str(&format!("\n{}\t{}", level, n));
                    }
                }
                out
            })?;
        }
        Commands::Ledger { .. } => {}
    }
    Ok(())
}
