use {
    anyhow::Result,
    ron::ser::{
        to_string_pretty,
        PrettyConfig,
    },
    serde::Serialize,
    std::{
        fs::File,
        io::Write,
        path::Path,
    },
};

/// Write a config to file as pretty-printed RON.
pub fn write_config<C: Serialize>(
    config: &C,
    path: impl AsRef<Path>,
) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(config, PrettyConfig::default())?.as_bytes())?;
    Ok(())
}
