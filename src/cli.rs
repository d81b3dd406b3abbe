use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "artsync")]
#[command(version)]
#[command(about = "Fetches and caches artist images for a local music library", long_about = None)]
pub struct Args {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Library folder to scan (repeatable, overrides config)
    #[arg(short, long = "library", value_name = "DIR")]
    pub libraries: Vec<PathBuf>,

    /// Log per-artist outcomes
    #[arg(short, long)]
    pub verbose: bool,

    /// Rescan the library and start a new batch every N seconds
    #[arg(long, value_name = "SECS", value_parser = parse_interval)]
    pub rescan_every: Option<Duration>,
}

impl Args {
    /// Folders to scan: command-line folders win over configured ones.
    pub fn library_folders(&self, configured: &[String]) -> Vec<PathBuf> {
        if !self.libraries.is_empty() {
            return self.libraries.clone();
        }
        configured.iter().map(PathBuf::from).collect()
    }
}

fn parse_interval(s: &str) -> Result<Duration, String> {
    match s.trim().parse::<u64>() {
        Ok(0) => Err("interval must be at least 1 second".to_string()),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(_) => Err(format!("Invalid value '{}': expected whole seconds", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_library_flag_is_repeatable_and_overrides_config() {
        let args = Args::try_parse_from(["artsync", "--library", "/a", "-l", "/b"])
            .expect("arguments should parse");
        assert_eq!(
            args.library_folders(&["/configured".to_string()]),
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }

    #[test]
    fn test_configured_folders_used_without_library_flag() {
        let args = Args::try_parse_from(["artsync"]).expect("arguments should parse");
        assert_eq!(
            args.library_folders(&["/music".to_string()]),
            vec![PathBuf::from("/music")]
        );
        assert!(!args.verbose);
        assert_eq!(args.rescan_every, None);
    }

    #[test]
    fn test_rescan_interval_parses_seconds_and_rejects_zero() {
        let args = Args::try_parse_from(["artsync", "--rescan-every", "600"])
            .expect("arguments should parse");
        assert_eq!(args.rescan_every, Some(Duration::from_secs(600)));
        assert!(Args::try_parse_from(["artsync", "--rescan-every", "0"]).is_err());
        assert!(Args::try_parse_from(["artsync", "--rescan-every", "soon"]).is_err());
    }
}
