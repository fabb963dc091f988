use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "linkscout")]
#[command(about = "LinkedIn people search - scrape visible profiles into a CSV")]
#[command(version)]
pub struct Cli {
    /// Search keyword
    #[arg(short, long, default_value = "software engineer")]
    pub keyword: String,

    /// Location the results are narrowed to
    #[arg(short, long, default_value = "India")]
    pub location: String,

    /// Number of result pages to scrape
    #[arg(short, long, default_value_t = 3)]
    pub pages: usize,

    /// Output CSV path
    #[arg(short, long, default_value = "linkedin_profiles.csv")]
    pub output: PathBuf,

    /// Run the browser without a visible window
    #[arg(long)]
    pub headless: bool,

    /// Explicit Chromium/Chrome executable
    #[arg(long, value_name = "PATH")]
    pub chrome: Option<PathBuf>,

    /// Do not download a managed Chromium when none is found
    #[arg(long)]
    pub no_install: bool,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_the_stock_search() {
        let cli = Cli::try_parse_from(["linkscout"]).unwrap();
        assert_eq!(cli.keyword, "software engineer");
        assert_eq!(cli.location, "India");
        assert_eq!(cli.pages, 3);
        assert_eq!(cli.output, PathBuf::from("linkedin_profiles.csv"));
        assert!(!cli.headless);
        assert_eq!(cli.chrome, None);
        assert!(!cli.no_install);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "linkscout",
            "--keyword",
            "data engineer",
            "--location",
            "Berlin",
            "--pages",
            "5",
            "-o",
            "/tmp/out.csv",
            "--headless",
            "--chrome",
            "/usr/bin/chromium",
            "--no-install",
        ])
        .unwrap();
        assert_eq!(cli.keyword, "data engineer");
        assert_eq!(cli.location, "Berlin");
        assert_eq!(cli.pages, 5);
        assert_eq!(cli.output, PathBuf::from("/tmp/out.csv"));
        assert!(cli.headless);
        assert_eq!(cli.chrome, Some(PathBuf::from("/usr/bin/chromium")));
        assert!(cli.no_install);
    }

    #[test]
    fn verbose_flag_counts() {
        let cli = Cli::try_parse_from(["linkscout", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn unknown_flag_fails() {
        assert!(Cli::try_parse_from(["linkscout", "--limit", "10"]).is_err());
    }
}
