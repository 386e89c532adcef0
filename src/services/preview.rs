//! Open Graph cards for shared player links.

use crate::error::AppError;
use crate::models::player::Player;
use crate::store::PlayerStore;
use url::form_urlencoded;

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Deep link into the roster page that opens this player's card.
pub fn roster_link(site_url: &str, nickname: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(nickname.as_bytes()).collect();
    format!("{}#roster?player={}", site_url, encoded)
}

pub fn render_card(player: &Player, site_url: &str) -> String {
    let name = escape_html(&player.nickname);
    let title = format!("{} [ELO {}]", name, player.rating);
    let description = format!(
        "{}W - {}L | Best streak {} | BOX 1V1",
        player.wins, player.losses, player.best_streak
    );
    let image = player
        .avatar_url
        .as_deref()
        .map(|url| {
            format!(
                "\n    <meta property=\"og:image\" content=\"{}\">",
                escape_html(url)
            )
        })
        .unwrap_or_default();
    let target = escape_html(&roster_link(site_url, &player.nickname));

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <meta property="og:title" content="{title}">
    <meta property="og:description" content="{description}">{image}
    <meta property="og:type" content="website">
    <meta name="twitter:card" content="summary_large_image">
    <meta http-equiv="refresh" content="0; url={target}">
  </head>
  <body>Loading {name}'s card...</body>
</html>
"#
    )
}

/// Card for an active player, or `None` when the link should fall back to
/// the roster page.
pub fn player_card<S: PlayerStore + ?Sized>(
    store: &S,
    nickname: &str,
    site_url: &str,
) -> Result<Option<String>, AppError> {
    Ok(store
        .find_active_by_nickname(nickname)?
        .map(|player| render_card(&player, site_url)))
}
