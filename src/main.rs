fn main() -> anyhow::Result<()> {
    catalog_sync_lib::run()
}
