use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;

use crate::layout::LayoutConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub data: PathBuf,
    pub sock: Option<PathBuf>,
    pub seed: u64,
    pub chunk: usize,
    pub font_min: f64,
    pub font_max: f64,
    pub spiral_step: f64,
    pub dump: bool,
    pub width: f64,
    pub height: f64,
}

impl AgentConfig {
    /// Layout settings for `--dump`; sessions replace the canvas with the
    /// viewer's viewport.
    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            font_min: self.font_min,
            font_max: self.font_max,
            spiral_step: self.spiral_step,
            chunk_size: self.chunk,
            seed: self.seed,
            ..LayoutConfig::default()
        }
        .with_canvas(self.width, self.height)
    }
}

pub fn parse_args() -> Result<AgentConfig> {
    parse_args_from(std::env::args_os().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<AgentConfig>
where
    I: IntoIterator<Item = OsString>,
{
    let defaults = LayoutConfig::default();
    let mut data = None;
    let mut sock = None;
    let mut seed = defaults.seed;
    let mut chunk = defaults.chunk_size;
    let mut font_min = defaults.font_min;
    let mut font_max = defaults.font_max;
    let mut spiral_step = defaults.spiral_step;
    let mut dump = false;
    let mut width = defaults.width;
    let mut height = defaults.height;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--data" {
            let Some(path) = args.next() else {
                anyhow::bail!("--data expects a path");
            };
            data = Some(PathBuf::from(path));
        } else if arg == "--sock" {
            let Some(path) = args.next() else {
                anyhow::bail!("--sock expects a path");
            };
            sock = Some(PathBuf::from(path));
        } else if arg == "--seed" {
            seed = parse_value("--seed", args.next())?;
        } else if arg == "--chunk" {
            chunk = parse_value("--chunk", args.next())?;
        } else if arg == "--font-min" {
            font_min = parse_value("--font-min", args.next())?;
        } else if arg == "--font-max" {
            font_max = parse_value("--font-max", args.next())?;
        } else if arg == "--spiral-step" {
            spiral_step = parse_value("--spiral-step", args.next())?;
        } else if arg == "--width" {
            width = parse_value("--width", args.next())?;
        } else if arg == "--height" {
            height = parse_value("--height", args.next())?;
        } else if arg == "--dump" {
            dump = true;
        } else {
            anyhow::bail!("unknown argument: {:?}", arg);
        }
    }

    let Some(data) = data else {
        anyhow::bail!("--data <csv> is required");
    };
    if chunk == 0 {
        anyhow::bail!("--chunk must be at least 1");
    }
    if !(font_min > 0.0 && font_min <= font_max) {
        anyhow::bail!("font sizes must satisfy 0 < --font-min <= --font-max");
    }
    if !(spiral_step > 0.0 && spiral_step.is_finite()) {
        anyhow::bail!("--spiral-step must be a positive number");
    }
    if !(width >= 0.0 && height >= 0.0) {
        anyhow::bail!("--width and --height must not be negative");
    }

    Ok(AgentConfig {
        data,
        sock,
        seed,
        chunk,
        font_min,
        font_max,
        spiral_step,
        dump,
        width,
        height,
    })
}

fn parse_value<T>(flag: &str, value: Option<OsString>) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let Some(value) = value else {
        anyhow::bail!("{flag} expects a value");
    };
    let value = value.to_string_lossy();
    value
        .parse()
        .with_context(|| format!("invalid value for {flag}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn data_alone_uses_defaults() {
        let config = parse_args_from(args(&["--data", "chat.csv"])).expect("config parsed");
        assert_eq!(config.data, PathBuf::from("chat.csv"));
        assert_eq!(config.sock, None);
        assert_eq!(config.seed, 0);
        assert_eq!(config.chunk, 32);
        assert!(!config.dump);
        assert_eq!(config.layout_config(), LayoutConfig::default());
    }

    #[test]
    fn parses_layout_flags() {
        let config = parse_args_from(args(&[
            "--data", "chat.csv", "--seed", "7", "--chunk", "8", "--font-min", "12",
            "--font-max", "96", "--spiral-step", "1.5", "--dump", "--width", "400",
            "--height", "300", "--sock", "/tmp/cc.sock",
        ]))
        .expect("config parsed");
        assert!(config.dump);
        assert_eq!(config.sock, Some(PathBuf::from("/tmp/cc.sock")));
        let layout = config.layout_config();
        assert_eq!(layout.seed, 7);
        assert_eq!(layout.chunk_size, 8);
        assert_eq!(layout.font_min, 12.0);
        assert_eq!(layout.font_max, 96.0);
        assert_eq!(layout.spiral_step, 1.5);
        assert_eq!((layout.width, layout.height), (400.0, 300.0));
    }

    #[test]
    fn data_is_required() {
        let err = parse_args_from(args(&["--seed", "1"])).expect_err("missing --data");
        assert!(err.to_string().contains("--data"));
    }

    #[test]
    fn rejects_unknown_flags_and_bad_values() {
        assert!(parse_args_from(args(&["--data", "a.csv", "--verbose"])).is_err());
        assert!(parse_args_from(args(&["--data", "a.csv", "--seed", "x"])).is_err());
        assert!(parse_args_from(args(&["--data", "a.csv", "--chunk"])).is_err());
        assert!(parse_args_from(args(&["--data", "a.csv", "--chunk", "0"])).is_err());
        assert!(parse_args_from(args(&["--data", "a.csv", "--font-min", "300"])).is_err());
        assert!(parse_args_from(args(&["--data", "a.csv", "--spiral-step", "0"])).is_err());
    }
}
