use crate::cli::ChatArgs;
use crate::models::chat::{ Message, Role };

use super::session::{ ChatSession, SendOutcome };
use super::transport::HttpProxyTransport;

use log::{ info, warn };
use std::error::Error;
use std::io::Write;
use std::time::Duration;
use tokio::io::{ AsyncBufReadExt, BufReader };

const RESTART_COMMAND: &str = "/restart";
const QUIT_COMMANDS: [&str; 2] = ["/quit", "/exit"];
const TYPING: &str = "client is typing…";

/// Terminal line for an appended message. `busy` is the send lock at that moment.
fn render(message: &Message, busy: bool) -> Option<String> {
    match message.role {
        Role::Assistant => Some(format!("client> {}", message.content)),
        // the user's own line is already on screen
        Role::User if busy => Some(TYPING.to_string()),
        Role::User | Role::System => None,
    }
}

fn print_message(message: &Message) {
    if let Some(line) = render(message, false) {
        println!("{}", line);
    }
}

fn prompt() {
    print!("you> ");
    let _ = std::io::stdout().flush();
}

/// Line-based chat against a running proxy. Input is read only between sends.
pub async fn run_terminal(args: &ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let transport = HttpProxyTransport::new(&args.proxy_url)?;
    info!("Chatting with proxy at {}", transport.endpoint());
    let mut session = ChatSession::with_delay(transport, Duration::from_millis(args.bubble_delay_ms));
    let busy = session.busy_indicator();

    println!("Type {} to start over, {} to leave.", RESTART_COMMAND, QUIT_COMMANDS[0]);
    session.messages().iter().for_each(print_message);
    prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if QUIT_COMMANDS.contains(&text) {
            break;
        }
        if text == RESTART_COMMAND {
            session.restart();
            println!("--- chat restarted ---");
            session.messages().iter().for_each(print_message);
        } else if !text.is_empty() {
            let on_message = |message: &Message| {
                if let Some(line) = render(message, busy.is_busy()) {
                    println!("{}", line);
                }
            };
            match session.send(text, on_message).await {
                Ok(SendOutcome::Delivered { .. }) => {}
                Ok(SendOutcome::Failed { error }) => eprintln!("error: {}", error),
                Err(e) => warn!("Send rejected: {}", e),
            }
        }
        prompt();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_marker_follows_the_user_turn_while_busy() {
        assert_eq!(render(&Message::user("hi"), true).as_deref(), Some(TYPING));
        assert_eq!(render(&Message::user("hi"), false), None);
    }

    #[test]
    fn assistant_bubbles_are_prefixed() {
        assert_eq!(render(&Message::assistant("I'm Mei."), true).as_deref(), Some("client> I'm Mei."));
        assert_eq!(render(&Message::system("x"), true), None);
    }
}
