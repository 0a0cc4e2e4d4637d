//! HTML pages.
//!
//! Templates live in `templates/` and are compiled into the binary. Every
//! number shown to the visitor is formatted here, so the templates only
//! place strings.

use std::sync::OnceLock;

use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use minijinja::{Environment, ErrorKind, context};
use serde::Serialize;

use crate::card::{self, Line, Theme};
use crate::format::{ordinal, rate, thousands};
use crate::stats::ProfileStats;
use crate::twitter::TwitterUser;

pub struct Templates {
    env: Environment<'static>,
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub screen_name: String,
    pub name: String,
    pub avatar: Option<String>,
    pub created_on: String,
    pub joined_today: bool,
    pub age: String,
    pub tweets: String,
    pub rate: String,
    pub anniversary: AnniversaryView,
    pub milestone: Option<MilestoneView>,
    pub card_dark: String,
    pub card_light: String,
}

#[derive(Debug, Serialize)]
pub struct AnniversaryView {
    pub today: bool,
    pub ordinal: String,
    pub date: String,
    pub countdown: String,
}

#[derive(Debug, Serialize)]
pub struct MilestoneView {
    pub target: String,
    pub remaining: String,
    pub wait: String,
    pub eta: Option<String>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("base.html", include_str!("../templates/base.html"))?;
        env.add_template("index.html", include_str!("../templates/index.html"))?;
        env.add_template("response.html", include_str!("../templates/response.html"))?;
        env.add_template("profile.html", include_str!("../templates/profile.html"))?;
        env.add_template("error.html", include_str!("../templates/error.html"))?;
        Ok(Self { env })
    }

    pub fn index(&self) -> Result<String, minijinja::Error> {
        self.env.get_template("index.html")?.render(context! {})
    }

    /// Landing page of the OAuth callback. `continue_url` is where the
    /// browser is forwarded to finish signing in.
    pub fn response(&self, continue_url: Option<&str>, denied: bool) -> Result<String, minijinja::Error> {
        self.env
            .get_template("response.html")?
            .render(context! { continue_url, denied })
    }

    pub fn profile(&self, user: &TwitterUser, stats: &ProfileStats) -> Result<String, minijinja::Error> {
        self.env
            .get_template("profile.html")?
            .render(profile_view(user, stats))
    }

    pub fn error(&self, status: StatusCode, message: &str) -> Result<String, minijinja::Error> {
        self.env.get_template("error.html")?.render(context! {
            code => status.as_u16(),
            reason => status.canonical_reason().unwrap_or("Error"),
            message,
        })
    }
}

/// Error responses are built outside any handler, so they keep their own
/// copy of the templates.
static ERROR_TEMPLATES: OnceLock<Option<Templates>> = OnceLock::new();

/// Render the error page for `status`.
pub fn error_page(status: StatusCode, message: &str) -> Result<String, minijinja::Error> {
    match ERROR_TEMPLATES.get_or_init(|| Templates::new().ok()) {
        Some(templates) => templates.error(status, message),
        None => Err(minijinja::Error::new(
            ErrorKind::TemplateNotFound,
            "templates failed to load",
        )),
    }
}

pub fn profile_view(user: &TwitterUser, stats: &ProfileStats) -> ProfileView {
    let anniversary = &stats.next_anniversary;
    let lines = card_lines(user, stats);

    ProfileView {
        screen_name: user.screen_name.clone(),
        name: user.name.clone(),
        avatar: user.profile_image_url_https.clone(),
        created_on: long_date(user.created_at.date_naive()),
        joined_today: anniversary.number == 0,
        age: stats.age.to_string(),
        tweets: thousands(stats.statuses_count),
        rate: rate(stats.average_rate_per_day),
        anniversary: AnniversaryView {
            today: anniversary.is_today(),
            ordinal: ordinal(u64::from(anniversary.number)),
            date: long_date(anniversary.next_occurrence.date_naive()),
            countdown: anniversary.delta.to_string(),
        },
        milestone: stats.milestone.map(|m| MilestoneView {
            target: thousands(m.target),
            remaining: thousands(m.remaining),
            wait: days(m.projected_cycles_needed),
            eta: stats.milestone_eta.map(long_date),
        }),
        card_dark: card::generate_svg(&lines, Theme::Dark),
        card_light: card::generate_svg(&lines, Theme::Light),
    }
}

/// Rows of the stats card.
pub fn card_lines(user: &TwitterUser, stats: &ProfileStats) -> Vec<Line> {
    let anniversary = &stats.next_anniversary;

    let mut lines = vec![
        Line::Header(format!("@{}", user.screen_name)),
        Line::stat("Name", user.name.as_str()),
        Line::stat("Joined", short_date(user.created_at)),
        Line::stat("Uptime", uptime(stats)),
        Line::stat(
            "Anniversary",
            format!(
                "{} on {}",
                ordinal(u64::from(anniversary.number)),
                short_date(anniversary.next_occurrence)
            ),
        ),
        Line::Blank,
        Line::Header("- Stats".to_string()),
        Line::stat("Tweets", thousands(stats.statuses_count)),
        Line::stat("Tweets/day", rate(stats.average_rate_per_day)),
        Line::stat("Followers", thousands(user.followers_count.max(0) as u64)),
        Line::stat("Following", thousands(user.friends_count.max(0) as u64)),
    ];

    if let Some(m) = stats.milestone {
        lines.push(Line::stat(
            "Next milestone",
            format!("{} (in {})", thousands(m.target), days(m.projected_cycles_needed)),
        ));
    }

    lines
}

fn uptime(stats: &ProfileStats) -> String {
    if stats.age.is_zero() {
        "less than a day".to_string()
    } else {
        stats.age.to_string()
    }
}

fn days(n: u64) -> String {
    format!("{} day{}", thousands(n), if n == 1 { "" } else { "s" })
}

fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn short_date(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d").to_string()
}
