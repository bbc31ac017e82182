use anyhow::{Context, Result};
use tokio::{
    io::{
        self, AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt,
        BufReader,
    },
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    select,
};
use tracing::{info, warn};

use crate::cli::ClientArgs;

pub async fn run(args: ClientArgs) -> Result<()> {
    let (mut reader, mut writer) = establish_connection(&args).await?;
    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    let Some(request) = request_line(&args, &mut stdin).await? else {
        return Ok(());
    };
    send_line(&mut writer, &request).await?;

    run_client_loop(&mut reader, &mut writer, &mut stdin, &mut stdout).await?;
    shutdown_connection(&mut writer).await;

    Ok(())
}

async fn establish_connection(args: &ClientArgs) -> Result<(OwnedReadHalf, OwnedWriteHalf)> {
    let stream = TcpStream::connect(args.server)
        .await
        .with_context(|| format!("failed to connect to {}", args.server))?;

    info!("connected to {}", args.server);
    Ok(stream.into_split())
}

async fn request_line(
    args: &ClientArgs,
    stdin: &mut BufReader<tokio::io::Stdin>,
) -> Result<Option<String>> {
    if let Some(text) = &args.text {
        return Ok(Some(text.clone()));
    }

    let mut line = String::new();
    if stdin.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end().to_string()))
}

async fn send_line<W>(writer: &mut W, line: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

/// Relays server text to `stdout` and `stdin` lines to the server until the
/// server closes the connection.
///
/// Input is collected with `read_until`, which keeps partially read bytes in
/// `pending` when server output wins the `select!`.
async fn run_client_loop<R, W, I, O>(
    reader: &mut R,
    writer: &mut W,
    stdin: &mut I,
    stdout: &mut O,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut buf = [0u8; 1024];
    let mut pending = Vec::new();
    let mut stdin_open = true;

    loop {
        select! {
            bytes_read = reader.read(&mut buf) => {
                let bytes_read = bytes_read?;
                if bytes_read == 0 {
                    break;
                }
                write_out(stdout, &buf[..bytes_read]).await?;
            }
            bytes_read = stdin.read_until(b'\n', &mut pending), if stdin_open => {
                if bytes_read? == 0 {
                    stdin_open = false;
                    continue;
                }
                let line = String::from_utf8_lossy(&pending).trim_end().to_string();
                pending.clear();
                send_line(writer, &line).await?;
            }
            ctrl_c = tokio::signal::ctrl_c() => {
                if let Err(error) = ctrl_c {
                    warn!(?error, "ctrl-c handler failed");
                }
                break;
            }
        }
    }
    Ok(())
}

async fn shutdown_connection(writer: &mut OwnedWriteHalf) {
    if let Err(error) = writer.shutdown().await {
        warn!(?error, "failed to shutdown client writer cleanly");
    }
}

async fn write_out<O>(out: &mut O, bytes: &[u8]) -> io::Result<()>
where
    O: AsyncWrite + Unpin,
{
    out.write_all(bytes).await?;
    out.flush().await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::{sleep, timeout};

    use super::*;

    #[tokio::test]
    async fn partial_stdin_line_survives_server_output() {
        let (mut server, client_side) = tokio::io::duplex(1024);
        let (mut reader, mut writer) = tokio::io::split(client_side);
        let (mut keyboard, stdin_side) = tokio::io::duplex(1024);
        let mut stdin = BufReader::new(stdin_side);
        let mut stdout = Vec::<u8>::new();

        let relay = run_client_loop(&mut reader, &mut writer, &mut stdin, &mut stdout);
        let script = async {
            keyboard.write_all(b"ye").await?;
            sleep(Duration::from_millis(50)).await;
            server.write_all(b"Do you want to add it? (y/n): ").await?;
            sleep(Duration::from_millis(50)).await;
            keyboard.write_all(b"s\n").await?;

            let mut answer = Vec::new();
            let mut chunk = [0u8; 64];
            while !answer.ends_with(b"\n") {
                let bytes = server.read(&mut chunk).await?;
                if bytes == 0 {
                    break;
                }
                answer.extend_from_slice(&chunk[..bytes]);
            }
            server.shutdown().await?;
            Ok::<_, std::io::Error>(answer)
        };

        let (relayed, answer) = timeout(Duration::from_secs(2), async {
            tokio::join!(relay, script)
        })
        .await
        .expect("relay finished");

        relayed.expect("relay");
        assert_eq!(answer.expect("answer"), b"yes\n");
        assert_eq!(stdout, b"Do you want to add it? (y/n): ");
    }
}
