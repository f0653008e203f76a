//! Stacks user-card markup.

use html_escape::{encode_double_quoted_attribute, encode_text};
use reqwest::Url;

use crate::types::{ExistingUser, MissingUser, User};

const UNITS: [&str; 4] = ["k", "m", "b", "t"];

/// Reputation with thousands separators: `1234567` → `"1,234,567"`.
pub fn full_reputation(reputation: u64) -> String {
    let digits = reputation.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Reputation as shown on a user card.
///
/// Below 10 000 this is [`full_reputation`]; above, compact notation with
/// three significant digits and a lower-case suffix (`17.4k`, `4.32m`).
pub fn abbreviated_reputation(reputation: u64) -> String {
    if reputation < 10_000 {
        return full_reputation(reputation);
    }

    let mut unit = 0;
    let mut value = reputation as f64 / 1_000.0;
    while value >= 1_000.0 && unit + 1 < UNITS.len() {
        value /= 1_000.0;
        unit += 1;
    }
    let mut rounded = round_significant(value);
    if rounded >= 1_000.0 && unit + 1 < UNITS.len() {
        rounded = round_significant(rounded / 1_000.0);
        unit += 1;
    }

    let decimals = 3usize.saturating_sub(integer_digits(rounded));
    let formatted = format!("{rounded:.decimals$}");
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };
    format!("{trimmed}{}", UNITS[unit])
}

fn integer_digits(value: f64) -> usize {
    let mut digits = 1;
    let mut v = value;
    while v >= 10.0 {
        v /= 10.0;
        digits += 1;
    }
    digits
}

fn round_significant(value: f64) -> f64 {
    let scale = 10f64.powi(3i32.saturating_sub(integer_digits(value) as i32));
    (value * scale).round() / scale
}

/// Strip scheme and host from a profile link so it resolves against the
/// current site. Anything that is not an absolute URL is returned as is.
pub fn relative_link(link: &str) -> String {
    match Url::parse(link) {
        Ok(url) if url.has_host() => {
            let mut relative = url.path().to_string();
            if let Some(query) = url.query() {
                relative.push('?');
                relative.push_str(query);
            }
            if let Some(fragment) = url.fragment() {
                relative.push('#');
                relative.push_str(fragment);
            }
            relative
        }
        _ => link.to_string(),
    }
}

fn time_html(time: Option<&str>) -> String {
    time.map(|t| format!(r#"<time class="s-user-card--time">{}</time>"#, encode_text(t)))
        .unwrap_or_default()
}

impl ExistingUser {
    /// Staff / Mod / Admin badges, space separated.
    pub fn badges_html(&self) -> String {
        let mut badges = Vec::new();
        if self.is_employee {
            badges.push(r#"<span class="s-badge s-badge__staff s-badge__xs">Staff</span>"#);
        }
        if self.is_moderator() {
            badges.push(r#"<span class="s-badge s-badge__moderator s-badge__xs">Mod</span>"#);
        } else if self.is_admin() {
            badges.push(r#"<span class="s-badge s-badge__admin s-badge__xs">Admin</span>"#);
        }
        badges.join(" ")
    }

    /// Minimal user card, optionally headed by a timestamp.
    pub fn to_html(&self, time: Option<&str>) -> String {
        let link = encode_double_quoted_attribute(&self.link);
        let avatar_link = relative_link(&self.link);
        let badges = self.badges_html();
        let name = if badges.is_empty() {
            encode_text(&self.display_name).into_owned()
        } else {
            format!("{} {badges}", encode_text(&self.display_name))
        };
        format!(
            concat!(
                r#"<div class="s-user-card s-user-card__minimal" data-uid="{uid}">"#,
                "{time}",
                r#"<a href="{avatar_link}" class="s-avatar s-user-card--avatar">"#,
                r#"<img class="s-avatar--image" src="{image}" /></a>"#,
                r#"<div class="s-user-card--info">"#,
                r#"<a href="{link}" class="s-user-card--link">{name}</a>"#,
                r#"<ul class="s-user-card--awards">"#,
                r#"<li class="s-user-card--rep" title="reputation score {full}">{abbreviated}</li>"#,
                "</ul></div></div>",
            ),
            uid = self.user_id,
            time = time_html(time),
            avatar_link = encode_double_quoted_attribute(&avatar_link),
            image = encode_double_quoted_attribute(&self.profile_image),
            link = link,
            name = name,
            full = full_reputation(self.reputation),
            abbreviated = abbreviated_reputation(self.reputation),
        )
    }
}

impl MissingUser {
    /// Deleted-user card: `user{id}` with an anonymous avatar.
    pub fn to_html(&self, time: Option<&str>) -> String {
        let link = encode_double_quoted_attribute(&self.link);
        format!(
            concat!(
                r#"<div class="s-user-card s-user-card__minimal s-user-card__deleted" data-uid="{uid}">"#,
                "{time}",
                r#"<a href="{link}" class="s-avatar s-user-card--avatar">"#,
                r#"<span class="anonymous-gravatar"></span></a>"#,
                r#"<div class="s-user-card--info">"#,
                r#"<a href="{link}" class="s-user-card--link">user{uid}</a>"#,
                "</div></div>",
            ),
            uid = self.user_id,
            time = time_html(time),
            link = link,
        )
    }
}

impl User {
    pub fn to_html(&self, time: Option<&str>) -> String {
        match self {
            User::Existing(u) => u.to_html(time),
            User::Missing(u) => u.to_html(time),
        }
    }
}
