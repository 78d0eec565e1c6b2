//! Board actor task
//!
//! A pure async task that owns a [`VirtualBoard`] and drives one protocol
//! session over a byte stream. A biased `select!` loop:
//! - handles shutdown requests from a command channel
//! - reads host bytes, frames them into lines, and dispatches commands
//! - takes one sample per pacing tick while sampling is enabled
//!
//! Commands are checked before the sample timer, so a disabling command that
//! is readable when a sample is also due suppresses that tick's sample.
//! Pacing lives here and only here; the board's sampler is pure computation.

use std::io;
use std::time::Duration;

use daq_protocol::{LineCodec, Reply};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::VirtualBoard;

/// Commands that can be sent to a board task
#[derive(Debug, Clone)]
pub enum BoardTaskCommand {
    /// Stop the protocol loop and release the stream
    Shutdown,
}

fn sample_period(rate_hz: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(rate_hz.max(1)))
}

fn new_sample_timer(rate_hz: u32) -> Interval {
    let mut timer = interval(sample_period(rate_hz));
    // When the loop falls behind, skip missed ticks instead of bursting
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    timer
}

/// Run the board protocol loop
///
/// Writes the `READY` handshake, then interleaves command processing and
/// paced sampling until shutdown is requested, the peer closes the stream,
/// or the transport fails. The stream is owned by the task and therefore
/// released on every exit path, including cancellation.
pub async fn run_board_task<S>(
    mut stream: S,
    mut board: VirtualBoard,
    mut cmd_rx: mpsc::Receiver<BoardTaskCommand>,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut codec = LineCodec::new();
    let mut buf = [0u8; 1024];

    info!(
        "starting board task for {} ({} channels)",
        board.board_name().unwrap_or("virtual board"),
        board.catalog().channel_count()
    );

    stream.write_all(&Reply::Ready.encode()).await?;
    stream.flush().await?;

    let mut timer_rate = board.rate_hz();
    let mut sample_timer = new_sample_timer(timer_rate);

    loop {
        tokio::select! {
            // Branches are checked in declaration order: shutdown and
            // inbound commands always win over the sample timer
            biased;

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(BoardTaskCommand::Shutdown) => {
                        info!("shutdown requested for board task");
                        break;
                    }
                    None => {
                        debug!("command channel closed, stopping board task");
                        break;
                    }
                }
            }

            result = stream.read(&mut buf) => {
                match result {
                    Ok(0) => {
                        debug!("host closed the stream");
                        break;
                    }
                    Ok(n) => {
                        let was_sampling = board.sampling_enabled();
                        codec.push_bytes(&buf[..n]);
                        while let Some(line) = codec.next_line() {
                            board.process_line(&line);
                        }
                        drain_output(&mut stream, &mut board).await?;

                        // Re-arm the pacing timer when sampling turns on or
                        // the rate changes; a fresh interval ticks
                        // immediately, so the enabling command's first
                        // sample goes out without waiting a full period
                        if board.sampling_enabled()
                            && (!was_sampling || board.rate_hz() != timer_rate)
                        {
                            timer_rate = board.rate_hz();
                            sample_timer = new_sample_timer(timer_rate);
                        }
                    }
                    Err(e) => {
                        warn!("transport read failed: {e}");
                        return Err(e);
                    }
                }
            }

            _ = sample_timer.tick(), if board.sampling_enabled() => {
                match board.sample() {
                    Ok(()) => drain_output(&mut stream, &mut board).await?,
                    // The whole line is dropped; sampling resumes next tick
                    Err(e) => error!("sample aborted: {e}"),
                }
            }
        }
    }

    info!("board task ended");
    Ok(())
}

/// Write every queued reply to the transport
async fn drain_output<S>(stream: &mut S, board: &mut VirtualBoard) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    while let Some(bytes) = board.take_output() {
        stream.write_all(&bytes).await?;
    }
    stream.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoardConfig, ChannelCatalog, ReadError, ValueSource};
    use daq_protocol::{parse_sample_line, InfoReply};
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf};
    use tokio::time::timeout;

    type HostLines = Lines<BufReader<ReadHalf<DuplexStream>>>;

    fn test_board() -> VirtualBoard {
        VirtualBoard::with_synthetic_source(BoardConfig::default())
    }

    async fn next_line(lines: &mut HostLines) -> String {
        timeout(Duration::from_millis(500), lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .expect("transport error")
            .expect("stream closed")
    }

    #[tokio::test]
    async fn handshake_then_settings_ack() {
        let (host, device) = tokio::io::duplex(1024);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let task = tokio::spawn(run_board_task(device, test_board(), cmd_rx));

        let (rd, mut wr) = tokio::io::split(host);
        let mut lines = BufReader::new(rd).lines();

        assert_eq!(next_line(&mut lines).await, "READY");

        wr.write_all(b"s1,50,101000\n").await.unwrap();
        assert_eq!(next_line(&mut lines).await, "OK");

        cmd_tx.send(BoardTaskCommand::Shutdown).await.unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn info_request_is_answered() {
        let (host, device) = tokio::io::duplex(1024);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let task = tokio::spawn(run_board_task(device, test_board(), cmd_rx));

        let (rd, mut wr) = tokio::io::split(host);
        let mut lines = BufReader::new(rd).lines();
        assert_eq!(next_line(&mut lines).await, "READY");

        wr.write_all(b"i\n").await.unwrap();
        let info = InfoReply::parse(&next_line(&mut lines).await).unwrap();
        assert_eq!(info.channel_count(), 6);
        assert_eq!(info.rate_hz, 100);
        assert_eq!(info.mask.to_string(), "100000");

        cmd_tx.send(BoardTaskCommand::Shutdown).await.unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn sampling_emits_active_channel_values() {
        let (host, device) = tokio::io::duplex(1024);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let task = tokio::spawn(run_board_task(device, test_board(), cmd_rx));

        let (rd, mut wr) = tokio::io::split(host);
        let mut lines = BufReader::new(rd).lines();
        assert_eq!(next_line(&mut lines).await, "READY");

        wr.write_all(b"s1,100,101000\n").await.unwrap();
        assert_eq!(next_line(&mut lines).await, "OK");

        for _ in 0..3 {
            let values = parse_sample_line(&next_line(&mut lines).await).unwrap();
            assert_eq!(values, vec![1000.0 / 6.0, 500.0]);
        }

        cmd_tx.send(BoardTaskCommand::Shutdown).await.unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn empty_mask_still_emits_terminated_lines() {
        let (host, device) = tokio::io::duplex(1024);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let task = tokio::spawn(run_board_task(device, test_board(), cmd_rx));

        let (rd, mut wr) = tokio::io::split(host);
        let mut lines = BufReader::new(rd).lines();
        assert_eq!(next_line(&mut lines).await, "READY");

        wr.write_all(b"s1,100,000000\n").await.unwrap();
        assert_eq!(next_line(&mut lines).await, "OK");
        assert_eq!(next_line(&mut lines).await, "");

        cmd_tx.send(BoardTaskCommand::Shutdown).await.unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn disable_suppresses_further_samples() {
        let (host, device) = tokio::io::duplex(1024);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let task = tokio::spawn(run_board_task(device, test_board(), cmd_rx));

        let (rd, mut wr) = tokio::io::split(host);
        let mut lines = BufReader::new(rd).lines();
        assert_eq!(next_line(&mut lines).await, "READY");

        wr.write_all(b"s1,100,101000\n").await.unwrap();
        assert_eq!(next_line(&mut lines).await, "OK");
        // Let at least one sample through
        let _ = next_line(&mut lines).await;

        wr.write_all(b"s0,100,101000\n").await.unwrap();
        // In-flight sample lines may precede the acknowledgment, but the
        // command-then-sample ordering means nothing follows it
        loop {
            if next_line(&mut lines).await == "OK" {
                break;
            }
        }
        let after_disable = timeout(Duration::from_millis(100), lines.next_line()).await;
        assert!(after_disable.is_err(), "no line expected after disable ack");

        cmd_tx.send(BoardTaskCommand::Shutdown).await.unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn malformed_settings_get_no_reply() {
        let (host, device) = tokio::io::duplex(1024);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let task = tokio::spawn(run_board_task(device, test_board(), cmd_rx));

        let (rd, mut wr) = tokio::io::split(host);
        let mut lines = BufReader::new(rd).lines();
        assert_eq!(next_line(&mut lines).await, "READY");

        // Non-numeric rate, then an info request: the very next reply must
        // be the info line (no OK in between) and must show untouched state
        wr.write_all(b"s1,abc,111111\ni\n").await.unwrap();
        let info = InfoReply::parse(&next_line(&mut lines).await).unwrap();
        assert_eq!(info.rate_hz, 100);
        assert_eq!(info.mask.to_string(), "100000");

        cmd_tx.send(BoardTaskCommand::Shutdown).await.unwrap();
        task.await.unwrap().unwrap();
    }

    struct AlwaysFails;

    impl ValueSource for AlwaysFails {
        fn read(&mut self, channel: usize) -> Result<f64, ReadError> {
            Err(ReadError {
                channel,
                reason: "conversion timeout".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn failed_reads_drop_lines_but_keep_the_loop_alive() {
        let board = VirtualBoard::new(ChannelCatalog::default(), Box::new(AlwaysFails));
        let (host, device) = tokio::io::duplex(1024);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let task = tokio::spawn(run_board_task(device, board, cmd_rx));

        let (rd, mut wr) = tokio::io::split(host);
        let mut lines = BufReader::new(rd).lines();
        assert_eq!(next_line(&mut lines).await, "READY");

        wr.write_all(b"s1,100,101000\n").await.unwrap();
        assert_eq!(next_line(&mut lines).await, "OK");

        // Every sample aborts, so the loop stays quiet but responsive
        wr.write_all(b"i\n").await.unwrap();
        let info = InfoReply::parse(&next_line(&mut lines).await).unwrap();
        assert_eq!(info.rate_hz, 100);

        cmd_tx.send(BoardTaskCommand::Shutdown).await.unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn peer_close_ends_task() {
        let (host, device) = tokio::io::duplex(1024);
        let (_cmd_tx, cmd_rx) = mpsc::channel(8);
        let task = tokio::spawn(run_board_task(device, test_board(), cmd_rx));

        let (rd, wr) = tokio::io::split(host);
        let mut lines = BufReader::new(rd).lines();
        assert_eq!(next_line(&mut lines).await, "READY");

        drop(lines);
        drop(wr);

        let result = timeout(Duration::from_millis(500), task).await.unwrap();
        assert!(result.unwrap().is_ok());
    }

    #[tokio::test]
    async fn shutdown_command_ends_task() {
        let (_host, device) = tokio::io::duplex(1024);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let task = tokio::spawn(run_board_task(device, test_board(), cmd_rx));

        cmd_tx.send(BoardTaskCommand::Shutdown).await.unwrap();

        let result = timeout(Duration::from_millis(500), task).await.unwrap();
        assert!(result.unwrap().is_ok());
    }
}
