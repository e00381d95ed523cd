use anyhow::{bail, Result};
use rk_tables::validate_list;
use rk_ingest::load_price_lists;

/// Prints one line per issue; any issue fails the command.
pub fn run(file: &str) -> Result<()> {
    let lists = load_price_lists(file)?;
    let mut failed = 0usize;
    for list in &lists {
        match validate_list(list) {
            Ok(()) => println!("list={} ok=true", list.id),
            Err(issues) => {
                failed += 1;
                println!("list={} ok=false issues={}", list.id, issues.len());
                for issue in &issues {
                    println!("  {issue}");
                }
            }
        }
    }
    if failed > 0 {
        bail!("LIST_INVALID: {failed} of {} list(s) have issues", lists.len());
    }
    Ok(())
}
