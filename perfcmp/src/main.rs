fn main() -> anyhow::Result<()> {
    perfcmp::run()
}
