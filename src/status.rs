use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Color,
    widgets::Paragraph,
    Frame,
};

use crate::config::THEMES;
use crate::desktop::{Desktop, PLUS_STATUS, POINTS_DISPLAY};
use crate::ui::sel_style;

/// Centre and right segments of the status bar: balance with tier, and the
/// active theme.
pub fn status_segments(desktop: &Desktop) -> (String, String) {
    let points = desktop.text(POINTS_DISPLAY).unwrap_or("0");
    let tier = desktop.text(PLUS_STATUS).unwrap_or_default();
    let centre = if tier.is_empty() {
        format!("{points} DP")
    } else {
        format!("{points} DP · {tier}")
    };
    let theme = desktop.root.theme.as_deref().unwrap_or(THEMES[0].0);
    (centre, format!("THEME: {}", theme.to_uppercase()))
}

pub fn render_status_bar(f: &mut Frame, area: Rect, color: Color, desktop: &Desktop) {
    if area.height == 0 {
        return;
    }
    let (centre, right) = status_segments(desktop);
    let clock = Local::now().format(" %a %d %b  %H:%M").to_string();

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);
    let style = sel_style(color);
    f.render_widget(Paragraph::new(clock).style(style), cols[0]);
    f.render_widget(Paragraph::new(centre).alignment(Alignment::Center).style(style), cols[1]);
    f.render_widget(
        Paragraph::new(format!("{right} ")).alignment(Alignment::Right).style(style),
        cols[2],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_show_balance_tier_and_theme() {
        let mut desktop = Desktop::norther();
        desktop.attach(POINTS_DISPLAY).text = "120".into();
        desktop.attach(PLUS_STATUS).text = "Free Tier".into();
        desktop.root.theme = Some("amber".into());
        let (centre, right) = status_segments(&desktop);
        assert_eq!(centre, "120 DP · Free Tier");
        assert_eq!(right, "THEME: AMBER");
    }

    #[test]
    fn segments_tolerate_a_bare_desktop() {
        let (centre, right) = status_segments(&Desktop::default());
        assert_eq!(centre, "0 DP");
        assert_eq!(right, "THEME: GREEN");
    }
}
