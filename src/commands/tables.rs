//! Conversion-table inspection command.

use comfy_table::Table;
use std::path::PathBuf;

use crate::core::Test;
use crate::errors::Result;
use crate::tables::TableStore;

pub struct TablesConfig {
    pub test: Option<Test>,
    pub data_dir: PathBuf,
}

pub fn run_tables(config: TablesConfig) -> Result<()> {
    let store = TableStore::load(&config.data_dir)?;
    let selected: Vec<Test> = match config.test {
        Some(test) => vec![test],
        None => Test::ALL.to_vec(),
    };

    for test in selected {
        let table = store.table(test);
        println!(
            "{test} ({}), residual SD {}",
            test.domain(),
            test.denominator()
        );
        let mut rendered = Table::new();
        rendered.set_header(vec!["scaled score", "raw lower", "raw upper"]);
        for row in table.rows() {
            rendered.add_row(vec![
                row.scaled_score.to_string(),
                row.lower_bound.to_string(),
                row.upper_bound.to_string(),
            ]);
        }
        println!("{rendered}");
        println!();
    }
    Ok(())
}
