//! 표준 입력 제어 명령.
//!
//! 한 줄에 명령 하나: `toggle`, `enable`, `disable`, `status`, `quit`.

use std::str::FromStr;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// 사용자 제어 명령
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Enable,
    Disable,
    Status,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toggle" | "t" => Ok(Command::Toggle),
            "enable" | "on" => Ok(Command::Enable),
            "disable" | "off" => Ok(Command::Disable),
            "status" | "s" => Ok(Command::Status),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(format!("알 수 없는 명령: {other}")),
        }
    }
}

/// stdin 리더 태스크 시작: 입력이 끝나면 채널이 닫힌다
pub fn spawn_stdin_reader() -> mpsc::Receiver<Command> {
    let (tx, rx) = mpsc::channel(8);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => match line.parse::<Command>() {
                    Ok(command) => {
                        if tx.send(command).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("{e}"),
                },
                Ok(None) => {
                    debug!("stdin 종료");
                    break;
                }
                Err(e) => {
                    warn!("stdin 읽기 실패: {e}");
                    break;
                }
            }
        }
    });
    rx
}
