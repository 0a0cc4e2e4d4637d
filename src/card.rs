//! Terminal-style SVG stats card.
//!
//! Each stat is a `key: ....... value` row padded with dot leaders so that
//! values line up on the right edge of a monospace column.

const START_Y: i32 = 30;
const LINE_HEIGHT: i32 = 20;
const LEFT_PADDING: f32 = 15.0;
const RIGHT_PADDING: f32 = 15.0;
const CHAR_WIDTH: f32 = 9.6;
const MIN_COL_CHARS: usize = 44;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

pub struct ThemeColors {
    pub bg: &'static str,
    pub text: &'static str,
    pub key: &'static str,
    pub value: &'static str,
    pub cc: &'static str,
}

impl Theme {
    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors {
                bg: "#15202b",
                text: "#d9d9d9",
                key: "#ffad1f",
                value: "#8ecdf8",
                cc: "#6e7d8c",
            },
            Theme::Light => ThemeColors {
                bg: "#ffffff",
                text: "#14171a",
                key: "#e0245e",
                value: "#1da1f2",
                cc: "#657786",
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Header(String),
    Blank,
    Stat { key: String, value: String },
}

impl Line {
    pub fn stat(key: &str, value: impl Into<String>) -> Self {
        Line::Stat {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Split a row into `("key: ", dots, value)` so the row is `align_width` wide.
pub fn build_stat_row(key: &str, value: &str, align_width: usize) -> (String, String, String) {
    let key_part = format!("{key}: ");
    let base_len = key_part.chars().count() + value.chars().count();
    let available = align_width.saturating_sub(base_len);

    let dots = match available {
        0 => "".to_string(),
        1 => " ".to_string(),
        2 => ". ".to_string(),
        n => format!("{} ", ".".repeat(n - 1)),
    };

    (key_part, dots, value.to_string())
}

fn build_header_line(label: &str, align_width: usize) -> String {
    let base = format!("{label} ");
    let dash_count = align_width.saturating_sub(base.chars().count()) + 2;
    format!("{base}{}", "-".repeat(dash_count))
}

/// Width in characters every row is padded to.
fn align_width(lines: &[Line]) -> usize {
    lines
        .iter()
        .map(|line| match line {
            Line::Stat { key, value } => key.chars().count() + 2 + value.chars().count() + 1,
            Line::Header(text) => text.chars().count() + 1,
            Line::Blank => 0,
        })
        .max()
        .unwrap_or(0)
        .max(MIN_COL_CHARS)
}

pub fn generate_svg(lines: &[Line], theme: Theme) -> String {
    let colors = theme.colors();
    let align_width = align_width(lines);

    let mut tspans = String::new();
    for (i, line) in lines.iter().enumerate() {
        let y = START_Y + (i as i32) * LINE_HEIGHT;

        match line {
            Line::Blank => {}
            Line::Header(text) => {
                tspans.push_str(&format!(
                    "<tspan x=\"{LEFT_PADDING}\" y=\"{y}\">{}</tspan>\n",
                    escape_xml(&build_header_line(text, align_width))
                ));
            }
            Line::Stat { key, value } => {
                let (k, d, v) = build_stat_row(key, value, align_width);
                tspans.push_str(&format!(
                    "<tspan x=\"{LEFT_PADDING}\" y=\"{y}\" class=\"key\">{}</tspan>\
                     <tspan class=\"cc\">{}</tspan><tspan class=\"value\">{}</tspan>\n",
                    escape_xml(&k),
                    escape_xml(&d),
                    escape_xml(&v)
                ));
            }
        }
    }

    let w = LEFT_PADDING + (align_width as f32 + 2.0) * CHAR_WIDTH + RIGHT_PADDING;
    let h = lines.len() as f32 * LINE_HEIGHT as f32 + START_Y as f32;

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="card card-{name}"
     width="{w}px" height="{h}px"
     font-family="ConsolasFallback,Consolas,monospace"
     font-size="16px">
<style>
.card-{name} .key   {{ fill: {key}; }}
.card-{name} .value {{ fill: {value}; }}
.card-{name} .cc    {{ fill: {cc}; }}
</style>
<rect width="{w}px" height="{h}px" fill="{bg}" rx="15"/>
<text fill="{text}" xml:space="preserve">
{tspans}</text>
</svg>
"#,
        name = theme.name(),
        bg = colors.bg,
        text = colors.text,
        key = colors.key,
        value = colors.value,
        cc = colors.cc,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_rows_fill_the_column() {
        let (k, d, v) = build_stat_row("Tweets", "1,234", 20);
        assert_eq!(k, "Tweets: ");
        assert_eq!(v, "1,234");
        assert_eq!(format!("{k}{d}{v}").chars().count(), 20);
        assert!(d.starts_with("...."));
    }

    #[test]
    fn short_gaps_stay_readable() {
        assert_eq!(build_stat_row("Age", "x", 6).1, "");
        assert_eq!(build_stat_row("Age", "x", 7).1, " ");
        assert_eq!(build_stat_row("Age", "x", 8).1, ". ");
    }

    #[test]
    fn header_runs_past_the_column() {
        let header = build_header_line("@jack", 10);
        assert_eq!(header, "@jack ------");
    }

    #[test]
    fn svg_contains_escaped_rows_and_theme() {
        let lines = vec![
            Line::Header("@jack".to_string()),
            Line::stat("Name", "Tom & Jerry <3"),
            Line::Blank,
            Line::stat("Tweets", "29,000"),
        ];
        let svg = generate_svg(&lines, Theme::Light);

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("card-light"));
        assert!(svg.contains("#1da1f2"));
        assert!(svg.contains("Tom &amp; Jerry &lt;3"));
        assert!(svg.contains(">29,000</tspan>"));
        assert!(svg.contains("y=\"90\""));
        assert!(!svg.contains("y=\"70\""));
    }

    #[test]
    fn themes_differ() {
        let lines = vec![Line::stat("Age", "1 day")];
        assert_ne!(
            generate_svg(&lines, Theme::Dark),
            generate_svg(&lines, Theme::Light)
        );
    }
}
