use anyhow::Context;

fn main() -> anyhow::Result<()> {
    textmend::cli::run().context("textmend failed")
}
