use camino::Utf8PathBuf;
use dirs::home_dir;

pub const DEFAULT_VERSEMARK_HOME: &str = ".versemark";

pub fn default_home_dir() -> Utf8PathBuf {
    if let Some(home) = home_dir() {
        if let Ok(home) = Utf8PathBuf::from_path_buf(home) {
            return home.join(DEFAULT_VERSEMARK_HOME);
        }
    }

    Utf8PathBuf::default()
}
