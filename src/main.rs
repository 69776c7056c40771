use anyhow::Result;

fn main() -> Result<()> {
    galtonboard::app::run()
}
