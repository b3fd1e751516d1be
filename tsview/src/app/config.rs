use app_core::string_error::ErrorStringExt;
use std::{io::Read, path::PathBuf};

const CONFIG_FILE_NAME: &str = ".tsview";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub svg_width: u64,
    pub svg_height: u64,
    pub line_width: f64,
    pub status_timeout_secs: u64,
    /// Fixed chrono format for time tick labels, `None` adapts the format
    /// to the visible time span.
    pub date_format: Option<String>,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            svg_width: 1000,
            svg_height: 700,
            line_width: 1.5,
            status_timeout_secs: 6,
            date_format: None,
            window_width: 1100.0,
            window_height: 700.0,
        }
    }
}

impl Config {
    pub fn from_config_file() -> Result<Self, String> {
        #[allow(deprecated)]
        let Some(home) = std::env::home_dir() else {
            return Err("could not determine home directory to load config file".into());
        };
        let config_raw = {
            let path = home.join(PathBuf::from(CONFIG_FILE_NAME));
            let mut file = std::fs::File::open(path).err_to_string("could not open config file")?;
            let mut buf = String::new();
            file.read_to_string(&mut buf)
                .err_to_string("could not load config file")?;
            buf
        };
        Ok(Self::from_config_str(&config_raw))
    }

    /// Parse `key=value` lines on top of the defaults. Lines starting with
    /// "#" are comments; unknown keys and bad values are skipped.
    pub fn from_config_str(config_raw: &str) -> Self {
        let mut config = Self::default();
        for line in config_raw.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                log::warn!("ignoring config line without '=': {line}");
                continue;
            };
            let (key, val) = (key.trim(), val.trim());
            match key {
                "svg_width" => parse_into(key, val, &mut config.svg_width),
                "svg_height" => parse_into(key, val, &mut config.svg_height),
                "line_width" => parse_into(key, val, &mut config.line_width),
                "status_timeout_secs" => parse_into(key, val, &mut config.status_timeout_secs),
                "window_width" => parse_into(key, val, &mut config.window_width),
                "window_height" => parse_into(key, val, &mut config.window_height),
                "date_format" => {
                    config.date_format = match val {
                        "" | "adaptive" => None,
                        fmt => Some(fmt.to_string()),
                    }
                }
                _ => log::warn!("unknown config key '{key}'"),
            }
        }
        config
    }
}

fn parse_into<T: std::str::FromStr>(key: &str, val: &str, target: &mut T) {
    match val.parse::<T>() {
        Ok(parsed) => *target = parsed,
        Err(_) => log::warn!("could not parse '{key}' from '{val}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_empty_config_yields_defaults() {
        init();
        assert_eq!(Config::from_config_str(""), Config::default());
    }

    #[test]
    fn test_known_keys_are_applied() {
        init();
        let config = Config::from_config_str(
            "# plot export\n\
             svg_width=1200\n\
             svg_height = 800\n\
             line_width=2.5\n\
             status_timeout_secs=3\n\
             date_format=%H:%M\n\
             window_width=900\n",
        );
        assert_eq!(config.svg_width, 1200);
        assert_eq!(config.svg_height, 800);
        assert_eq!(config.line_width, 2.5);
        assert_eq!(config.status_timeout_secs, 3);
        assert_eq!(config.date_format.as_deref(), Some("%H:%M"));
        assert_eq!(config.window_width, 900.0);
        assert_eq!(config.window_height, Config::default().window_height);
    }

    #[test]
    fn test_bad_values_and_unknown_keys_are_ignored() {
        init();
        let config = Config::from_config_str(
            "svg_width=wide\n\
             search_path=/tmp\n\
             no equals sign\n\
             date_format=adaptive\n",
        );
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_from_config_file() {
        // The result depends on the machine, it must not panic though.
        #[allow(unused)]
        let res = Config::from_config_file();
        dbg!(res);
    }
}
