//! Ledger setup commands.

use anyhow::Result;
use aura_core::store::SqliteStore;
use aura_core::Engine;

pub fn run(engine: &Engine<SqliteStore>, admin_id: &str, admin_name: &str) -> Result<()> {
    let ctx = engine.bootstrap(admin_id, admin_name)?;
    println!("initialized ledger");
    println!("active season: {}", ctx.active);
    println!("admin user:    {admin_id}");
    Ok(())
}

pub fn ensure_user(engine: &Engine<SqliteStore>, id: &str, name: &str) -> Result<()> {
    let user = engine.ensure_user(id, name)?;
    println!("{} ({})", user.id, user.display_name);
    Ok(())
}
