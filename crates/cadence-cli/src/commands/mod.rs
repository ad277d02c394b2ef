//! Subcommand arguments and implementations

pub mod receive;
pub mod run;
pub mod tcp_send;
pub mod timer;

use cadence_timers::TimerStrategy;
use clap::Args;

#[derive(Args, Debug)]
pub struct TimerArgs {
    /// busy_wait, blocking, worst_case or worst_case:<us>
    #[arg(short, long)]
    pub strategy: Option<TimerStrategy>,

    /// Tick rate in Hz
    #[arg(short, long)]
    pub frequency: Option<u32>,

    /// Number of ticks to measure
    #[arg(short = 'n', long, default_value_t = 20)]
    pub ticks: u32,
}

#[derive(Args, Debug)]
pub struct TcpSendArgs {
    /// Address to listen on
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Number of messages to send before closing
    #[arg(short = 'n', long, default_value_t = 1_000)]
    pub count: u64,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Address to listen on
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Tick rate in Hz
    #[arg(short, long)]
    pub frequency: Option<u32>,

    /// Milliseconds each tick may wait for the previous send
    #[arg(long)]
    pub tolerance_ms: Option<u32>,

    /// Skip ticks whose previous send is still in flight
    #[arg(long)]
    pub skip_mode: bool,

    /// Timer strategy
    #[arg(long)]
    pub strategy: Option<TimerStrategy>,

    /// Payload size in bytes
    #[arg(long)]
    pub payload_bytes: Option<usize>,

    /// Serve the payload from a temporary file through sendfile
    #[arg(long)]
    pub zero_copy: bool,

    /// Message sent once before the loop starts
    #[arg(long)]
    pub hello: Option<String>,

    /// Time limit for the hello message
    #[arg(long, default_value_t = 1_000)]
    pub hello_timeout_ms: u32,

    /// Stop after this many ticks (0 runs until the client leaves)
    #[arg(short = 'n', long, default_value_t = 0)]
    pub ticks: u64,

    /// Accept the next client after a run ends
    #[arg(long)]
    pub always_on: bool,

    /// Skip memory locking, FIFO scheduling and pinning
    #[arg(long)]
    pub unprivileged: bool,
}

#[derive(Args, Debug)]
pub struct ReceiveArgs {
    /// Host running the sender
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port the sender listens on
    #[arg(short, long, default_value_t = 9000)]
    pub port: u16,

    /// Kernel receive buffer size in bytes
    #[arg(long)]
    pub recv_buffer_bytes: Option<usize>,

    /// Stop after this many seconds (0 reads until the sender closes)
    #[arg(long, default_value_t = 0)]
    pub seconds: u64,
}
