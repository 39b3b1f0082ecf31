fn main() -> anyhow::Result<()> {
    showroom::run(showroom::SceneConfig::default())
}
