use anyhow::{Context, Result, anyhow, bail};
use apicast_core::{
    ApiError, Config, ModelPricing, ProviderId, TemperatureUnit, Units, WeatherObservation,
    WeatherQuery,
    provider::{chat_provider_from_env, weather_provider_from_env},
    report::{display_zone, format_report, format_summary, format_usage},
    units::convert_temperature,
};
use chrono::{DateTime, FixedOffset, Utc};
use clap::{ArgAction, Parser, Subcommand};

/// Demo questions asked by `apicast usage` when no question is given.
const DEMO_QUERIES: [(&str, &str); 2] = [
    ("Запит українською", "Що таке штучний інтелект? Дай коротку відповідь."),
    ("Запит англійською", "What is artificial intelligence? Give a brief answer."),
];

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "apicast", version, about = "Weather report and LLM token usage demos")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the current weather for a city.
    Weather {
        /// City name; prompted for interactively when absent.
        city: Option<String>,

        /// Unit system, "metric" or "imperial". Defaults to the configured value.
        #[arg(long)]
        units: Option<String>,

        /// Print the compact summary instead of the full report.
        #[arg(long)]
        brief: bool,

        /// Also show the temperature in another scale ("fahrenheit" or "kelvin").
        #[arg(long)]
        convert: Option<String>,
    },

    /// Ask a language model and report token usage and cost.
    Usage {
        /// Question to ask; the two built-in demo questions run when absent.
        query: Option<String>,

        /// Model name; defaults to the configured model.
        #[arg(long)]
        model: Option<String>,

        /// Print only the answer, without token counters.
        #[arg(long)]
        plain: bool,
    },

    /// Inspect or change the stored configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the config file location.
    Path,

    /// Print the effective configuration as TOML.
    Show,

    /// Set token rates (USD per million tokens) for a model or model family.
    SetPrice {
        /// Exact model name or family prefix, e.g. "gpt-4o-mini".
        model: String,
        /// Rate for prompt tokens.
        prompt: f64,
        /// Rate for completion tokens.
        completion: f64,
    },
}

impl Command {
    /// `config path` has to work even when the stored file does not parse.
    fn needs_config(&self) -> bool {
        !matches!(self, Command::Config { action: ConfigAction::Path })
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        if !self.command.needs_config() {
            return print_config_path();
        }
        let config = Config::load()?;

        match self.command {
            Command::Weather { city, units, brief, convert } => {
                show_weather(&config, city, units, brief, convert).await
            }
            Command::Usage { query, model, plain } => ask(&config, query, model, plain).await,
            Command::Config { action } => configure(config, action),
        }
    }
}

async fn show_weather(
    config: &Config,
    city: Option<String>,
    units: Option<String>,
    brief: bool,
    convert: Option<String>,
) -> Result<()> {
    let units = match units {
        Some(name) => Units::try_from(name.as_str())?,
        None => config.openweather.units,
    };
    if !brief && units != Units::Metric {
        bail!("The full report is metric only.\nHint: add --brief for {units} units.");
    }
    let convert_to = convert.as_deref().map(TemperatureUnit::parse_lossy);
    if convert_to.is_some() && units != Units::Metric {
        bail!("--convert expects metric readings; drop --units {units}.");
    }

    if city.is_none() {
        println!("{}\n", platform_banner(&os_info::get()));
    }

    // Fail on a missing key before asking anything.
    let provider = weather_provider_from_env(config)
        .map_err(|err| with_key_hint(ProviderId::OpenWeather, err))?;

    let city = match city {
        Some(city) => city,
        None => inquire::Text::new("Введіть назву міста:")
            .prompt()
            .context("Failed to read city name")?,
    };
    let city = city.trim();
    if city.is_empty() {
        bail!("Назва міста не може бути порожньою");
    }

    let query = WeatherQuery::new(city)
        .with_units(units)
        .with_lang(config.openweather.lang.clone());
    let outcome = provider.fetch(&query).await;

    let view = WeatherView { brief, units, convert_to };
    let text = view.render(
        city,
        &outcome,
        Utc::now(),
        display_zone(config.openweather.display_utc_offset_secs),
    )?;
    println!("{text}");

    Ok(())
}

/// How `apicast weather` presents a fetched observation.
#[derive(Debug, Clone, Copy)]
struct WeatherView {
    brief: bool,
    units: Units,
    convert_to: Option<TemperatureUnit>,
}

impl WeatherView {
    fn render(
        &self,
        city: &str,
        outcome: &Result<WeatherObservation, ApiError>,
        now: DateTime<Utc>,
        zone: FixedOffset,
    ) -> Result<String> {
        let report = format_report(city, outcome, now, zone);
        let obs = match outcome {
            Ok(obs) => obs,
            Err(_) => bail!("Помилка виконання запиту: {report}"),
        };

        let mut text = if self.brief { format_summary(obs, self.units) } else { report };
        if let Some(target) = self.convert_to {
            text.push_str(&format!(
                "\nТемпература ({}): {}",
                target.as_str(),
                convert_temperature(obs.temperature(), target)
            ));
        }

        Ok(text)
    }
}

async fn ask(
    config: &Config,
    query: Option<String>,
    model: Option<String>,
    plain: bool,
) -> Result<()> {
    let provider =
        chat_provider_from_env(config).map_err(|err| with_key_hint(ProviderId::OpenAi, err))?;
    let model = model.unwrap_or_else(|| config.openai.default_model.clone());

    let questions: Vec<(String, String)> = match query {
        Some(q) => vec![("Запит".to_string(), q)],
        None => DEMO_QUERIES.iter().map(|(t, q)| (t.to_string(), q.to_string())).collect(),
    };

    let mut failed = 0;
    for (i, (title, question)) in questions.iter().enumerate() {
        if i > 0 {
            println!("\n{}\n", "=".repeat(50));
        }
        println!("{title}:");
        println!("Питання: {question}\n");

        let answer = if plain {
            provider.query(question, &model).await.map(|text| format!("Відповідь: {text}"))
        } else {
            provider.query_with_usage(question, &model).await.map(|report| format_usage(&report))
        };

        match answer {
            Ok(text) => println!("{text}"),
            Err(err) => {
                tracing::warn!(error = %err, reason = ?err.reason(), "query failed");
                eprintln!("Помилка: {err}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} queries failed", questions.len());
    }
    Ok(())
}

fn configure(mut config: Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => print_config_path()?,
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
        }
        ConfigAction::SetPrice { model, prompt, completion } => {
            let pricing =
                ModelPricing { prompt_per_million: prompt, completion_per_million: completion };
            config.set_model_pricing(&model, pricing)?;
            config.save()?;
            println!(
                "Pricing for {model}: ${prompt}/1M prompt, ${completion}/1M completion (saved to {})",
                Config::config_file_path()?.display()
            );
        }
    }

    Ok(())
}

fn print_config_path() -> Result<()> {
    println!("{}", Config::config_file_path()?.display());
    Ok(())
}

/// Host description shown before the interactive weather prompt.
fn platform_banner(info: &os_info::Info) -> String {
    format!(
        "Операційна система: {} ({})\nВерсія системи: {}\napicast: {}",
        info.os_type(),
        info.bitness(),
        info.version(),
        env!("CARGO_PKG_VERSION"),
    )
}

fn with_key_hint(id: ProviderId, err: ApiError) -> anyhow::Error {
    match err {
        ApiError::CredentialMissing { .. } => anyhow!(
            "{err}\nHint: export {} (get a key at {}).",
            id.credential_var(),
            id.signup_url()
        ),
        other => other.into(),
    }
}
