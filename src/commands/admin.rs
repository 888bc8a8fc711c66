use crate::*;

pub fn handle_ledger_commands(cli: &Cli, config: &ConfigFile) -> anyhow::Result<bool> {
    let Commands::Ledger { command } = &cli.command else {
        return Ok(false);
    };
    let path = resolve_standalone_ledger_path(cli.ledger.as_deref(), config);

    match command {
        LedgerCommands::Verify => {
            let entries = read_entries(&path)?;
            let report = verify_chain(&entries)?;
            let valid = report.valid;
            let index = report.first_invalid_index;
            print_one(cli.json, report, |r| {
                if r.valid {
                    format!(
                        "ledger ok: {} entries, head {}",
                        r.total_entries, r.head_hash
                    )
                } else {
                    format!(
                        "ledger BROKEN at entry {}: {} ({} of {} verified)",
                        r.first_invalid_index.unwrap_or(0),
                        r.error_message.as_deref().unwrap_or("unknown"),
                        r.verified_entries,
                        r.total_entries
                    )
                }
            })?;
            if !valid {
                anyhow::bail!(
                    "ledger integrity check failed at entry {} ({})",
                    index.unwrap_or(0),
                    path.display()
                );
            }
        }
        LedgerCommands::List => {
            let entries = read_entries(&path)?;
            print_out(cli.json, &entries, |e| {
                format!(
                    "{}\t{}\t{}\t{}\t{}",
                    e.entry_id, e.report_id, e.certification_level, e.evid_effective, e.chain_hash
                )
            })?;
        }
    }

    Ok(true)
}
