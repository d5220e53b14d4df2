use api::{App, Bot, Discord};
use core::{convert::Infallible, pin::pin, str::FromStr, time::Duration};
use game::Config;
use hyper::{server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use std::{
    env,
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
    sync::Arc,
};
use store::{JsonQuestions, ScoreFiles};
use tokio::{net::TcpListener, runtime::Runtime};

/// Reads an optional environment variable.
fn var_opt<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => Ok(Some(value.parse()?)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Parse environment variables
    let port: u16 = env::var("PORT")?.parse()?;
    let token = env::var("BOT_TOKEN")?;
    let mut public = [0; 32];
    hex::decode_to_slice(env::var("PUB_KEY")?, &mut public)?;

    let questions = var_opt("QUESTIONS_PATH")?.unwrap_or_else(|| PathBuf::from("data/questions.json"));
    let scores = var_opt("SCORES_DIR")?.unwrap_or_else(|| PathBuf::from("data/scores"));
    let defaults = Config::default();
    let config = Config {
        show_score_interval: var_opt("SHOW_SCORE_INTERVAL")?.unwrap_or(defaults.show_score_interval),
        next_question_gap: var_opt("NEXT_QUESTION_GAP_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.next_question_gap),
        skip_count: var_opt("SKIP_COUNT")?.unwrap_or(defaults.skip_count),
        hint_delay: var_opt("HINT_DELAY_MS")?.map(Duration::from_millis).unwrap_or(defaults.hint_delay),
    };
    log::info!("questions from {}, scores in {}, {config:?}", questions.display(), scores.display());

    let runtime = Runtime::new()?;
    runtime.block_on(async move {
        let bot = Bot::new(Discord::new(token), JsonQuestions::new(questions), ScoreFiles::new(scores), config);
        let app = Arc::new(App::new(bot, &public)?);
        serve(app, port).await
    })
}

async fn serve(app: Arc<App>, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = (Ipv4Addr::UNSPECIFIED, port).into();
    let listener = TcpListener::bind(addr).await?;
    log::info!("listening for interactions on {addr}");

    let mut stop = pin!(tokio::signal::ctrl_c());
    loop {
        let (stream, peer) = tokio::select! {
            biased;
            result = &mut stop => {
                result?;
                break;
            }
            result = listener.accept() => match result {
                Ok(pair) => pair,
                Err(err) => {
                    log::warn!("failed to accept a connection: {err}");
                    continue;
                }
            },
        };

        let app = Arc::clone(&app);
        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let app = Arc::clone(&app);
                async move { Ok::<_, Infallible>(app.respond(req).await) }
            });
            if let Err(err) = http1::Builder::new().serve_connection(TokioIo::new(stream), service).await {
                log::error!("connection with {peer} failed: {err}");
            }
        });
    }

    log::info!("shutting down");
    Ok(())
}
