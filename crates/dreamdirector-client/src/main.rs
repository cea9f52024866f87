//! DreamDirector terminal client.

use std::error::Error;
use std::sync::Arc;

use dreamdirector_client::api::ApiClient;
use dreamdirector_client::config::ClientConfig;
use dreamdirector_client::controller::Director;
use dreamdirector_client::persistence::FileSnapshotStore;
use dreamdirector_client::view::{self, Command, Screen};
use dreamdirector_core::clock::SystemClock;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr so they never interleave with the story.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    let api = ApiClient::new(&config.api_url);
    match api.health().await {
        Ok(health) if !health.generation_available => {
            eprintln!("Backend is up but has no generative provider configured.");
        }
        Ok(_) => {}
        Err(e) => eprintln!("Backend at {} is not reachable yet: {e}", config.api_url),
    }

    let snapshots = Arc::new(FileSnapshotStore::new(&config.state_dir));
    let mut director = Director::open(api, snapshots, Arc::new(SystemClock)).await;
    let mut screen = if director.state().is_story_active {
        Screen::Story
    } else {
        Screen::Home
    };

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    show(&mut stdout, &view::render(screen, director.state(), director.api())).await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        director.apply_pending_refreshes().await;

        let command = Command::parse(&line);
        // Errors were already turned into notifications.
        match command {
            Command::Empty => continue,
            Command::Quit => break,
            Command::New(prompt) => {
                if prompt.trim().is_empty() {
                    show(&mut stdout, "Usage: new <your story idea>\n").await?;
                    continue;
                }
                show(&mut stdout, "Directing your story...\n").await?;
                if let Ok(true) = director.start_story(&prompt).await {
                    screen = Screen::Story;
                }
            }
            Command::Pick(index) => {
                let choice = director
                    .state()
                    .current_story
                    .as_ref()
                    .and_then(|story| view::picked_choice(story, index))
                    .map(str::to_owned);
                match choice {
                    Some(choice) => {
                        show(&mut stdout, "Directing the next scene...\n").await?;
                        let _ = director.make_choice(&choice).await;
                        screen = Screen::Story;
                    }
                    None => show(&mut stdout, "No such choice.\n").await?,
                }
            }
            Command::Choose(text) => {
                if director.state().is_story_active {
                    show(&mut stdout, "Directing the next scene...\n").await?;
                    let _ = director.make_choice(&text).await;
                    screen = Screen::Story;
                } else {
                    show(&mut stdout, "Unknown command. Type `help`.\n").await?;
                    continue;
                }
            }
            Command::Generate(kind, prompt) => {
                if prompt.trim().is_empty() {
                    show(&mut stdout, &format!("Usage: {kind} <prompt>\n")).await?;
                    continue;
                }
                show(&mut stdout, &format!("Generating {kind}...\n")).await?;
                if let Ok(true) = director.generate_media(kind, &prompt).await {
                    screen = Screen::Gallery;
                }
            }
            Command::Refresh => {
                if let Ok(added) = director.refresh_media().await {
                    show(&mut stdout, &format!("{added} new media file(s)\n")).await?;
                }
                screen = Screen::Gallery;
            }
            Command::ClearVideos => {
                director.clear_videos().await;
                screen = Screen::Gallery;
            }
            Command::Reset => {
                director.reset().await;
                screen = Screen::Home;
            }
            Command::Gallery => screen = Screen::Gallery,
            Command::Story => screen = Screen::Story,
            Command::About => screen = Screen::About,
            Command::Help => {
                show(&mut stdout, &view::render_help()).await?;
                continue;
            }
        }

        let notifications = director.take_notifications();
        show(&mut stdout, &view::render_notifications(&notifications)).await?;
        show(&mut stdout, &view::render(screen, director.state(), director.api())).await?;
    }

    Ok(())
}

async fn show(stdout: &mut tokio::io::Stdout, text: &str) -> std::io::Result<()> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await
}
