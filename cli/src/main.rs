use anyhow::{anyhow, bail, Result};
use clap::{Args, Parser, Subcommand};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::flows::{
    AccountView, ErrorBody, LoginRequest, LoginResponse, RecordVideoRequest, RegisterRequest,
    VideoVerification, VideoView,
};
use std::io::{self, BufRead, Write};
use zeroize::Zeroizing;

use crate::persistence::Session;
mod persistence;

#[derive(Args, Debug)]
struct RegisterInput {
    email: String,
}

#[derive(Args, Debug)]
struct LoginInput {
    email: String,
}

#[derive(Args, Debug)]
struct UploadInput {
    /// Where the video is hosted
    location_url: String,
    title: String,
}

#[derive(Args, Debug)]
struct VerifyInput {
    video_id: uuid::Uuid,
}

#[derive(Subcommand, Debug)]
enum Subcommands {
    /// Create an account and its custodial wallet
    Register(RegisterInput),
    /// Log in and save the session token
    Login(LoginInput),
    /// Sign and record a video upload
    Upload(UploadInput),
    /// List your recorded videos
    List,
    /// Check a recorded video's signature
    Verify(VerifyInput),
}

#[derive(Parser, Debug)]
#[command(name = "clipmark")]
struct Arguments {
    /// Backend base URL; defaults to the server of the saved session
    #[arg(long, env = "CLIPMARK_SERVER")]
    server: Option<String>,

    #[command(subcommand)]
    command: Subcommands,
}

/// Reads one line from stdin. Only the line terminator is stripped;
/// surrounding spaces are part of the password.
fn prompt_password(prompt: &str) -> Result<Zeroizing<String>> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut password = Zeroizing::new(String::new());
    io::stdin().lock().read_line(&mut password)?;

    let len = password.trim_end_matches(['\r', '\n']).len();
    password.truncate(len);
    if password.is_empty() {
        bail!("password must not be empty");
    }

    Ok(password)
}

const DEFAULT_SERVER: &str = "http://localhost:3000";

/// An explicit `--server` wins, then the server the session was issued by.
fn resolve_server(explicit: Option<&str>, session: Option<&Session>) -> String {
    explicit
        .or(session.map(|s| s.server.as_str()))
        .unwrap_or(DEFAULT_SERVER)
        .to_string()
}

fn endpoint(server: &str, path: &str) -> String {
    format!("{}{}", server.trim_end_matches('/'), path)
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response: Response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    match response.json::<ErrorBody>().await {
        Ok(body) => Err(anyhow!("{} ({}): {}", body.kind, status, body.message)),
        Err(_) => Err(anyhow!("request failed with {}", status)),
    }
}

async fn register(server: &str, email: &str) -> Result<()> {
    let password = prompt_password("Choose a password: ")?;

    println!("Registering, this takes a moment...");
    let account: AccountView = send(
        reqwest::Client::new()
            .post(endpoint(server, "/register"))
            .json(&RegisterRequest {
                email: email.to_string(),
                password: password.to_string(),
            }),
    )
    .await?;

    println!("Registration successful!");
    println!("Account ID:\t{}", account.id);
    println!("Wallet:\t\t{}", account.wallet_address);

    Ok(())
}

async fn login(server: &str, email: &str) -> Result<()> {
    let password = prompt_password("Password: ")?;

    let response: LoginResponse = send(
        reqwest::Client::new()
            .post(endpoint(server, "/login"))
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            }),
    )
    .await?;

    persistence::save_session(&Session {
        server: server.to_string(),
        email: response.account.email.clone(),
        token: response.token,
    })?;

    println!("Logged in as {}", response.account.email);
    println!("Wallet:\t{}", response.account.wallet_address);

    Ok(())
}

async fn upload(server: Option<&str>, input: UploadInput) -> Result<()> {
    let session = persistence::load_session()?;
    let server = resolve_server(server, Some(&session));
    let password = prompt_password("Password (unlocks your signing key): ")?;

    let video: VideoView = send(
        reqwest::Client::new()
            .post(endpoint(&server, "/videos"))
            .bearer_auth(&session.token)
            .json(&RecordVideoRequest {
                location_url: input.location_url,
                title: input.title,
                password: password.to_string(),
            }),
    )
    .await?;

    println!("Recorded video {}", video.id);
    println!("Signed at:\t{}", video.signed_at);
    println!("Signature:\t{}", video.signature);

    Ok(())
}

async fn list(server: Option<&str>) -> Result<()> {
    let session = persistence::load_session()?;
    let server = resolve_server(server, Some(&session));

    let videos: Vec<VideoView> = send(
        reqwest::Client::new()
            .get(endpoint(&server, "/videos"))
            .bearer_auth(&session.token),
    )
    .await?;

    if videos.is_empty() {
        println!("No videos recorded for {}", session.email);
    }
    for video in videos {
        println!("{}\t{}\t{}\t{}", video.id, video.signed_at, video.title, video.location_url);
    }

    Ok(())
}

async fn verify(server: &str, video_id: uuid::Uuid) -> Result<()> {
    let verification: VideoVerification = send(
        reqwest::Client::new().get(endpoint(server, &format!("/videos/{video_id}/verify"))),
    )
    .await?;

    println!("Signer:\t{}", verification.wallet_address);
    println!("Message:\n{}", verification.message);
    if verification.valid {
        println!("Signature is valid");
        Ok(())
    } else {
        bail!("signature does not match the owner's wallet")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Arguments::parse();
    let explicit = args.server.as_deref();
    let server = resolve_server(explicit, None);

    match args.command {
        Subcommands::Register(input) => register(&server, &input.email).await,
        Subcommands::Login(input) => login(&server, &input.email).await,
        Subcommands::Upload(input) => upload(explicit, input).await,
        Subcommands::List => list(explicit).await,
        Subcommands::Verify(input) => verify(&server, input.video_id).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_paths() {
        assert_eq!(endpoint("http://localhost:3000/", "/login"), "http://localhost:3000/login");
        assert_eq!(endpoint("http://h", "/videos"), "http://h/videos");
    }

    #[test]
    fn saved_session_server_is_used_unless_overridden() {
        let session = Session {
            server: "http://saved:3000".to_string(),
            email: "a@x.com".to_string(),
            token: "t".to_string(),
        };

        assert_eq!(resolve_server(None, Some(&session)), "http://saved:3000");
        assert_eq!(resolve_server(Some("http://flag"), Some(&session)), "http://flag");
        assert_eq!(resolve_server(None, None), DEFAULT_SERVER);
    }

    #[test]
    fn parses_subcommands() {
        let args = Arguments::try_parse_from([
            "clipmark",
            "--server",
            "http://h",
            "upload",
            "https://cdn/v1.mp4",
            "My Clip",
        ])
        .unwrap();
        assert_eq!(args.server.as_deref(), Some("http://h"));
        assert!(matches!(args.command, Subcommands::Upload(ref u) if u.title == "My Clip"));

        assert!(Arguments::try_parse_from(["clipmark", "verify", "not-a-uuid"]).is_err());
    }
}
