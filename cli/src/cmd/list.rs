use anyhow::Result;
use clap::Args;
use hop::inventory::Inventory;
use hop::table::instance_table;

use crate::cmd::no_instances;
use crate::cmd::Run;

/// List instances found in the inventory
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only list instances whose id, name or location contain every term.
    filter: Vec<String>,
}

impl Run for ListArgs {
    async fn run(&self, inventory: Inventory) -> Result<i32> {
        let instances = inventory.filter(&self.filter);
        if instances.is_empty() {
            return Ok(no_instances());
        }

        println!("{}", instance_table(&instances));
        Ok(0)
    }
}
