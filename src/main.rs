//! moji-export: export saved words and sentences from a MOJi dictionary account

use anyhow::Result;

fn main() -> Result<()> {
    moji_export::cli::run()
}
