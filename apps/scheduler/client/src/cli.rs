use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "scheduler-client")]
#[command(about = "Interactive client for the event scheduler")]
pub struct Cli {
    /// The server host or IP address
    #[arg(long, env = "SCHEDULER_HOST", default_value = "localhost")]
    pub dst: String,

    /// The server port
    #[arg(short = 'p', long, env = "SCHEDULER_PORT", default_value_t = 50051)]
    pub port: u16,

    /// Sender id to resume; 0 asks the server for a new one
    #[arg(long = "sender-id", default_value_t = 0)]
    pub sender_id: i64,

    /// Do not subscribe to the sender's notification queue
    #[arg(long)]
    pub no_listen: bool,

    /// Send Zstd-compressed requests; the server must have compression enabled
    #[arg(long, env = "SCHEDULER_COMPRESSION")]
    pub compress: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(
            ["SCHEDULER_HOST", "SCHEDULER_PORT", "SCHEDULER_COMPRESSION"],
            || {
                let cli = Cli::parse_from(["scheduler-client"]);
                assert_eq!(cli.dst, "localhost");
                assert_eq!(cli.port, 50051);
                assert_eq!(cli.sender_id, 0);
                assert!(!cli.no_listen);
                assert!(!cli.compress);
            },
        );
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "scheduler-client",
            "--dst",
            "10.0.0.5",
            "-p",
            "6000",
            "--sender-id",
            "42",
            "--no-listen",
            "--compress",
        ]);
        assert_eq!(cli.dst, "10.0.0.5");
        assert_eq!(cli.port, 6000);
        assert_eq!(cli.sender_id, 42);
        assert!(cli.no_listen);
        assert!(cli.compress);
    }

    #[test]
    fn test_env_fallback() {
        temp_env::with_vars(
            [("SCHEDULER_HOST", Some("scheduler")), ("SCHEDULER_PORT", Some("7000"))],
            || {
                let cli = Cli::parse_from(["scheduler-client"]);
                assert_eq!(cli.dst, "scheduler");
                assert_eq!(cli.port, 7000);
            },
        );
    }
}
