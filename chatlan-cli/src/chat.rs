use anyhow::{Context, Result};
use chatlan_core::{PeerId, Role, SignalKind, UserProfile};
use chatlan_session::{
    ChannelOutput, IgnoreReason, LocalIdentity, RtcEngine, Session, SessionConfig, SessionEvent,
    SessionHandle, SignalOutcome, TransportConfig,
};
use colored::*;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const HELP: &str = "\
  /offer           create a new offer token (host)
  /paste <token>   apply a token from the other side
  /peers           list peers and pending handshakes
  /cancel <id>     drop a handshake or peer
  /quit            leave
  anything else    is sent as a chat message";

/// Interactive loop: session events and stdin lines, whichever comes first.
pub async fn run(
    role: Role,
    profile: &UserProfile,
    transport: TransportConfig,
    config: SessionConfig,
) -> Result<()> {
    let engine = RtcEngine::new(transport).context("Failed to initialise WebRTC")?;
    let (output, mut events) = ChannelOutput::new();
    let session = Session::spawn(
        role,
        LocalIdentity::from(profile),
        Arc::new(engine),
        Arc::new(output),
        config,
    );

    println!(
        "{} {} as {} (session {})",
        "ChatLan".green().bold(),
        role,
        profile.name.bold(),
        session.code()
    );
    println!("{HELP}");

    if role == Role::Host {
        session.create_offer().await?;
        println!("{}", "Gathering candidates for the first offer...".cyan());
    } else {
        println!("{}", "Paste the host's offer with /paste <token>.".cyan());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                print_event(event);
            }

            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else { break };
                if !handle_line(&session, line.trim()).await? {
                    break;
                }
            }
        }
    }

    session.shutdown().await;
    drain(&mut events);
    println!("{}", "Bye.".dimmed());
    Ok(())
}

/// Returns false when the user wants out.
async fn handle_line(session: &SessionHandle, line: &str) -> Result<bool> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

    match command {
        "" => {}
        "/quit" | "/exit" => return Ok(false),
        "/help" => println!("{HELP}"),
        "/offer" => match session.create_offer().await {
            Ok(peer_id) => println!("{} {}", "Preparing offer".cyan(), short(&peer_id)),
            Err(e) => println!("{} {}", "!".red(), e),
        },
        "/paste" => report_outcome(session.apply_signal(rest).await?),
        "/peers" => print_peers(session).await?,
        "/cancel" => match find_peer(session, rest.trim()).await? {
            Some(peer_id) => {
                session.cancel(peer_id).await?;
            }
            None => println!("{} no peer matches '{}'", "!".red(), rest.trim()),
        },
        _ if command.starts_with('/') => println!("{} unknown command {}", "!".red(), command),
        _ => {
            if let Err(e) = session.send_chat(line).await {
                println!("{} {}", "!".red(), e);
            }
        }
    }

    Ok(true)
}

fn report_outcome(outcome: SignalOutcome) {
    match outcome {
        SignalOutcome::Accepted(peer_id) => {
            println!("{} {}", "Token accepted for".green(), short(&peer_id));
        }
        SignalOutcome::Ignored(reason) => {
            let why = match reason {
                IgnoreReason::Undecodable => "not a ChatLan token",
                IgnoreReason::WrongRole => "that token is meant for the other role",
                IgnoreReason::AlreadyLinked => "already linked to a host",
                IgnoreReason::NoPendingOffer => "no offer is waiting for this answer",
                IgnoreReason::Ambiguous => "several offers are waiting; use a newer token",
            };
            println!("{} {}", "Ignored:".yellow(), why);
        }
    }
}

fn print_event(event: SessionEvent) {
    match event {
        SessionEvent::SignalReady {
            peer_id,
            kind,
            token,
        } => {
            let label = match kind {
                SignalKind::Offer => "Offer token",
                SignalKind::Answer => "Answer token",
            };
            println!(
                "{} for {} (give this to the other side):",
                label.green().bold(),
                short(&peer_id)
            );
            println!("{token}");
        }
        SessionEvent::PeerJoined {
            peer_id,
            display_name,
        } => {
            let name = display_name.unwrap_or_else(|| short(&peer_id));
            println!("{} {}", "+".green(), format!("{name} joined").green());
        }
        SessionEvent::MessageReceived { message, .. } => {
            println!("{} {}", format!("{}:", message.sender_name).bold(), message.text);
        }
        SessionEvent::PeerLeft { peer_id } => {
            println!("{} {} left", "-".yellow(), short(&peer_id));
        }
        SessionEvent::HandshakeFailed { peer_id, error } => {
            println!("{} handshake {} failed: {}", "!".red(), short(&peer_id), error);
        }
    }
}

async fn print_peers(session: &SessionHandle) -> Result<()> {
    let snapshot = session.snapshot().await?;

    println!("{} {} ({})", "Session".bold(), snapshot.code, snapshot.role);
    for peer in &snapshot.peers {
        println!(
            "  {} {:<20} {:?}",
            short(&peer.id),
            peer.display_name.as_deref().unwrap_or("-"),
            peer.status
        );
    }
    for handshake in &snapshot.handshakes {
        println!(
            "  {} handshake {:?}",
            short(&handshake.peer_id),
            handshake.state
        );
    }
    if snapshot.peers.is_empty() {
        println!("  {}", "nobody here yet".dimmed());
    }
    Ok(())
}

/// Accepts a full id or the short prefix shown in listings.
async fn find_peer(session: &SessionHandle, needle: &str) -> Result<Option<PeerId>> {
    if needle.is_empty() {
        return Ok(None);
    }
    let snapshot = session.snapshot().await?;
    Ok(snapshot
        .handshakes
        .iter()
        .map(|h| h.peer_id)
        .find(|id| id.to_string().starts_with(needle)))
}

fn short(peer_id: &PeerId) -> String {
    peer_id.to_string().chars().take(8).collect()
}

fn drain(events: &mut mpsc::UnboundedReceiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        print_event(event);
    }
}
