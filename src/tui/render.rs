use std::borrow::Cow;

use super::state::{AppState, Page, VizTab};
use super::views::{density_layers, GeoView, MapPoint};
use crate::query::CategoryMean;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap,
    },
    Frame,
};

/// Low / mid / high colours for the density layers.
const DENSITY_COLORS: [Color; 3] = [Color::Blue, Color::Yellow, Color::Red];

pub fn draw(f: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, state, chunks[0]);
    match state.page {
        Page::Home => draw_home(f, state, chunks[1]),
        Page::Geospatial => draw_geospatial(f, state, chunks[1]),
        Page::Visualization => draw_visualization(f, state, chunks[1]),
    }
    draw_logs(f, state, chunks[2]);
    draw_footer(f, state, chunks[3]);
}

fn draw_header(f: &mut Frame, state: &AppState, area: Rect) {
    let titles: Vec<Line> = Page::ALL
        .iter()
        .enumerate()
        .map(|(i, p)| Line::from(format!("{} {}", i + 1, p.title())))
        .collect();

    let title = format!(
        " Listing Analysis | {} rows | {} | Up: {} ",
        state.row_count,
        truncate_with_ellipsis(&state.dataset_label, 48),
        state.uptime()
    );

    let tabs = Tabs::new(titles)
        .select(state.page.index())
        .highlight_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(tabs, area);
}

fn draw_home(f: &mut Frame, state: &AppState, area: Rect) {
    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let key = Style::default().fg(Color::Yellow);

    let lines = vec![
        Line::from(Span::styled("Short-term rental listings", heading)),
        Line::from(""),
        Line::from(format!(
            "{} listings across {} countries and {} property types.",
            state.row_count,
            state.countries.len(),
            state.property_types.len()
        )),
        Line::from(""),
        Line::from(Span::styled("Pages", heading)),
        Line::from(vec![
            Span::styled("  Geospatial Analysis", key),
            Span::raw(" - price map of a country and rating map of a suburb, filtered by a price bound"),
        ]),
        Line::from(vec![
            Span::styled("  Visualization", key),
            Span::raw(" - top suburbs by mean price, price by property type, occupancy by country"),
        ]),
        Line::from(""),
        Line::from(Span::styled("Keys", heading)),
        Line::from(vec![Span::styled("  Tab / 1-3", key), Span::raw("  switch page")]),
        Line::from(vec![Span::styled("  c / C", key), Span::raw("      next / previous country")]),
        Line::from(vec![Span::styled("  s / S", key), Span::raw("      next / previous suburb")]),
        Line::from(vec![Span::styled("  + / -", key), Span::raw("      raise / lower price bound")]),
        Line::from(vec![Span::styled("  \u{2190} / \u{2192}", key), Span::raw("      switch chart tab")]),
        Line::from(vec![Span::styled("  t / T", key), Span::raw("      next / previous property type")]),
        Line::from(vec![Span::styled("  o", key), Span::raw("          next occupancy window")]),
        Line::from(vec![Span::styled("  j / k", key), Span::raw("      scroll listing names")]),
        Line::from(vec![Span::styled("  q", key), Span::raw("          quit")]),
    ];

    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(" Home ").borders(Borders::ALL));
    f.render_widget(para, area);
}

fn draw_geospatial(f: &mut Frame, state: &AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    draw_geo_selection(f, state, chunks[0]);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(cols[0]);

    draw_density_map(f, &state.geo, &state.geo.price_points, " Price Distribution ", left[0]);
    draw_names(f, state, left[1]);
    draw_density_map(f, &state.geo, &state.geo.rating_points, " Rating Distribution ", cols[1]);
}

fn draw_geo_selection(f: &mut Frame, state: &AppState, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::Cyan);

    let price = match (state.slider, state.max_price()) {
        (Some(s), Some(p)) => format!("{:.0} ({:.0}\u{2013}{:.0})", p, s.range().min, s.range().max),
        _ => "\u{2014}".to_string(),
    };
    let suburb_pos = if state.suburbs.is_empty() {
        "0/0".to_string()
    } else {
        format!("{}/{}", state.geo_suburb + 1, state.suburbs.len())
    };

    let line = Line::from(vec![
        Span::styled(" Country: ", dim),
        Span::styled(state.geo_country_name().unwrap_or("\u{2014}").to_string(), value),
        Span::styled(" | Max price: ", dim),
        Span::styled(price, value),
        Span::styled(format!(" | Suburb [{}]: ", suburb_pos), dim),
        Span::styled(state.geo_suburb_name().unwrap_or("\u{2014}").to_string(), value),
    ]);

    let title = match (state.geo_country_name(), state.geo_suburb_name()) {
        (Some(c), Some(s)) => format!(" {}, {} ", c, s),
        (Some(c), None) => format!(" {} ", c),
        _ => " Geospatial Analysis ".to_string(),
    };
    let para = Paragraph::new(line).block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(para, area);
}

fn draw_density_map(f: &mut Frame, view: &GeoView, points: &[MapPoint], title: &str, area: Rect) {
    let Some((x_bounds, y_bounds)) = view.bounds() else {
        let reason = view.no_data.as_deref().unwrap_or("No data");
        draw_no_data(f, title, reason, area);
        return;
    };
    if points.is_empty() {
        draw_no_data(f, title, "No listings to plot", area);
        return;
    }

    let layers = density_layers(points);
    let canvas = Canvas::default()
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            for (coords, color) in layers.iter().zip(DENSITY_COLORS) {
                ctx.draw(&Points { coords: coords.as_slice(), color });
            }
        });
    f.render_widget(canvas, area);
}

fn draw_names(f: &mut Frame, state: &AppState, area: Rect) {
    let names = &state.geo.names;
    if names.is_empty() {
        let reason = state
            .geo
            .no_data
            .as_deref()
            .unwrap_or("No listings at or under this price");
        draw_no_data(f, " Listings ", reason, area);
        return;
    }

    let visible = area.height.saturating_sub(2) as usize;
    let offset = state.names_scroll.min(names.len().saturating_sub(visible));
    let width = area.width.saturating_sub(8) as usize;

    let rows: Vec<Row> = names
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, n)| {
            Row::new(vec![
                Cell::from(format!("{:>4}", i + 1)).style(Style::default().fg(Color::DarkGray)),
                Cell::from(truncate_with_ellipsis(n, width).into_owned()),
            ])
        })
        .collect();

    let title = format!(
        " Listings [{}/{}] ",
        (offset + rows.len()).min(names.len()),
        names.len()
    );
    let table = Table::new(rows, [Constraint::Length(5), Constraint::Min(0)])
        .block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(table, area);
}

fn draw_visualization(f: &mut Frame, state: &AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let titles: Vec<Line> = VizTab::ALL.iter().map(|t| Line::from(t.title())).collect();
    let tabs = Tabs::new(titles)
        .select(state.viz_tab.index())
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(tabs, chunks[0]);

    match state.viz_tab {
        VizTab::PriceVsLocation => draw_price_vs_location(f, state, chunks[1]),
        VizTab::PriceVsPropertyType => draw_price_vs_property_type(f, state, chunks[1]),
        VizTab::Occupancy => draw_occupancy(f, state, chunks[1]),
    }
}

fn draw_price_vs_location(f: &mut Frame, state: &AppState, area: Rect) {
    let country = state.viz_country_name().unwrap_or("\u{2014}");
    if state.top_suburbs.is_empty() {
        draw_no_data(f, " Price vs Location ", &format!("No listings in {}", country), area);
        return;
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let chart_title = format!(" {} [c] \u{00b7} mean price by suburb ", country);
    draw_vertical_bars(f, &state.top_suburbs, &chart_title, Color::Cyan, cols[0]);

    let header = Row::new(vec!["#", "Suburb", "Mean", "Rows"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = state
        .top_suburbs
        .iter()
        .enumerate()
        .map(|(i, m)| {
            Row::new(vec![
                Cell::from((i + 1).to_string()),
                Cell::from(m.label.clone()),
                Cell::from(format!("{:.0}", m.value)).style(Style::default().fg(Color::Green)),
                Cell::from(m.count.to_string()).style(Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!(" {} Suburbs with Highest Average Price ", country))
            .borders(Borders::ALL),
    );
    f.render_widget(table, cols[1]);
}

fn draw_price_vs_property_type(f: &mut Frame, state: &AppState, area: Rect) {
    let property_type = state.property_type_name().unwrap_or("\u{2014}");
    let title = format!(" {} [t] \u{00b7} mean price by country ", property_type);
    if state.property_type_means.is_empty() {
        draw_no_data(f, &title, &format!("No {} listings", property_type), area);
        return;
    }

    let label_width = state
        .property_type_means
        .iter()
        .map(|m| m.label.chars().count())
        .max()
        .unwrap_or(0)
        .min(20);

    let bars: Vec<Bar> = state
        .property_type_means
        .iter()
        .map(|m| {
            Bar::default()
                .value(bar_value(m.value))
                .text_value(format!("{:.0}", m.value))
                .label(Line::from(truncate_with_ellipsis(&m.label, label_width).into_owned()))
                .style(Style::default().fg(Color::Green))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .value_style(Style::default().fg(Color::Black).bg(Color::Green))
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

fn draw_occupancy(f: &mut Frame, state: &AppState, area: Rect) {
    let title = format!(" {} [o] \u{00b7} mean occupancy by country ", state.occupancy_window);
    if state.occupancy_means.is_empty() {
        draw_no_data(f, &title, "No listings loaded", area);
        return;
    }
    draw_vertical_bars(f, &state.occupancy_means, &title, Color::Green, area);
}

fn draw_vertical_bars(f: &mut Frame, means: &[CategoryMean], title: &str, color: Color, area: Rect) {
    let inner = area.width.saturating_sub(2) as usize;
    let slot = (inner / means.len().max(1)).max(2);
    let bar_width = (slot - 1).min(12) as u16;

    let bars: Vec<Bar> = means
        .iter()
        .map(|m| {
            Bar::default()
                .value(bar_value(m.value))
                .text_value(format!("{:.0}", m.value))
                .label(Line::from(truncate_with_ellipsis(&m.label, bar_width as usize).into_owned()))
                .style(Style::default().fg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .bar_width(bar_width)
        .bar_gap(1)
        .value_style(Style::default().fg(Color::Black).bg(color))
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

/// Bar heights are integers; means are non-negative by construction.
fn bar_value(v: f64) -> u64 {
    v.max(0.0).round() as u64
}

fn draw_no_data(f: &mut Frame, title: &str, reason: &str, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No data",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(reason.to_string(), Style::default().fg(Color::DarkGray))),
    ];
    let para = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    f.render_widget(para, area);
}

fn draw_logs(f: &mut Frame, state: &AppState, area: Rect) {
    let max_width = area.width.saturating_sub(2) as usize; // borders
    let visible_lines = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .take(visible_lines)
        .map(|l| {
            let color = match l.level.as_str() {
                "ERROR" => Color::Red,
                "WARN" => Color::Yellow,
                _ => Color::DarkGray,
            };
            let prefix = format!(" {} [{}] ", l.time, l.level);
            let msg_max = max_width.saturating_sub(prefix.len());
            let msg = truncate_with_ellipsis(&l.message, msg_max);
            Line::from(vec![
                Span::styled(prefix, Style::default().fg(color)),
                Span::raw(msg.into_owned()),
            ])
        })
        .collect();

    let block = Block::default().title(" Status ").borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(f: &mut Frame, state: &AppState, area: Rect) {
    let key = Style::default().fg(Color::Yellow);
    let mut spans = vec![
        Span::styled("  [q]", key),
        Span::raw("uit  "),
        Span::styled("[Tab]", key),
        Span::raw(" page  "),
    ];
    match state.page {
        Page::Home => {}
        Page::Geospatial => spans.extend([
            Span::styled("[c/C]", key),
            Span::raw(" country  "),
            Span::styled("[+/-]", key),
            Span::raw(" price  "),
            Span::styled("[s/S]", key),
            Span::raw(" suburb  "),
            Span::styled("[j/k]", key),
            Span::raw(" scroll  "),
        ]),
        Page::Visualization => spans.extend([
            Span::styled("[\u{2190}/\u{2192}]", key),
            Span::raw(" tab  "),
            Span::styled("[c/C]", key),
            Span::raw(" country  "),
            Span::styled("[t/T]", key),
            Span::raw(" type  "),
            Span::styled("[o]", key),
            Span::raw(" window  "),
        ]),
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn truncate_with_ellipsis(s: &str, max_width: usize) -> Cow<'_, str> {
    let char_count = s.chars().count();
    if char_count <= max_width {
        Cow::Borrowed(s)
    } else if max_width <= 3 {
        Cow::Owned(".".repeat(max_width))
    } else {
        let end = s
            .char_indices()
            .nth(max_width - 3)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        Cow::Owned(format!("{}...", &s[..end]))
    }
}
