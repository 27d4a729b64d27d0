use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use enum_dispatch::enum_dispatch;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Direction, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::Line;
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart as LineChart, Dataset, GraphType, Paragraph, Widget,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::aggregate::{histogram, Aggregator, HistogramBin};
use crate::ledger::RawRow;

const AXIS_DATE_FORMAT: &str = "%d-%m-%Y";

const PALETTE: [Color; 6] = [Color::Cyan, Color::Yellow, Color::Magenta, Color::Green, Color::Blue, Color::Red];

const TITLE_STYLE: Style = Style::new().add_modifier(Modifier::BOLD);
const AXIS_STYLE: Style = Style::new().fg(Color::DarkGray);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartKind {
    /// Share of spending per category
    Category,
    /// Distribution of expense amounts
    Histogram,
    /// Amounts plotted by date
    Timeline,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Category, ChartKind::Histogram, ChartKind::Timeline];
}

#[enum_dispatch]
pub trait ChartView {
    fn title(&self) -> &'static str;

    fn is_empty(&self) -> bool;

    /// Draws the chart, framed and titled, into `area` of `buf`.
    fn draw(&self, area: Rect, buf: &mut Buffer);
}

#[enum_dispatch(ChartView)]
#[derive(Debug, Clone)]
pub enum Chart {
    CategoryShare,
    AmountHistogram,
    SpendingOverTime,
}

impl Chart {
    pub fn build(kind: ChartKind, records: &[RawRow], aggregator: &Aggregator, bins: NonZeroUsize) -> Chart {
        match kind {
            ChartKind::Category => CategoryShare::new(&aggregator.category_totals(records)).into(),
            ChartKind::Histogram => AmountHistogram::new(histogram(&aggregator.amounts(records), bins)).into(),
            ChartKind::Timeline => SpendingOverTime::new(aggregator.time_series(records)).into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub category: String,
    pub amount: Decimal,
    /// Share of the total in percent, one decimal place.
    pub percent: Decimal,
}

/// Terminal stand-in for a pie chart: one bar per category, labelled with its
/// percentage of the total.
#[derive(Debug, Clone)]
pub struct CategoryShare {
    slices: Vec<Slice>,
}

impl CategoryShare {
    pub fn new(totals: &BTreeMap<String, Decimal>) -> CategoryShare {
        let sum = totals
            .values()
            .fold(Decimal::ZERO, |sum, amount| sum.checked_add(*amount).unwrap_or(Decimal::MAX));
        let slices = totals
            .iter()
            .map(|(category, amount)| Slice {
                category: category.clone(),
                amount: *amount,
                percent: amount
                    .checked_div(sum)
                    .and_then(|share| share.checked_mul(dec!(100)))
                    .map(|percent| percent.round_dp(1))
                    .unwrap_or(Decimal::ZERO),
            })
            .collect();

        CategoryShare { slices }
    }

    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }
}

impl ChartView for CategoryShare {
    fn title(&self) -> &'static str {
        "Expense Distribution by Category"
    }

    fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    fn draw(&self, area: Rect, buf: &mut Buffer) {
        let block = chart_block(self.title());
        if self.is_empty() {
            return draw_placeholder(block, area, buf);
        }

        let bars: Vec<Bar> = self
            .slices
            .iter()
            .enumerate()
            .map(|(i, slice)| {
                Bar::default()
                    .label(Line::from(format!("{} ({:.1}%)", slice.category, slice.percent)))
                    .value((slice.percent * dec!(10)).to_u64().unwrap_or(0))
                    .text_value(format!("{:.2}", slice.amount))
                    .style(Style::default().fg(PALETTE[i % PALETTE.len()]))
            })
            .collect();

        BarChart::default()
            .block(block)
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(1)
            .max(1000)
            .data(BarGroup::default().bars(&bars))
            .render(area, buf);
    }
}

/// Frequency of amounts over a fixed number of equal-width bins.
#[derive(Debug, Clone)]
pub struct AmountHistogram {
    bins: Vec<HistogramBin>,
}

impl AmountHistogram {
    pub fn new(bins: Vec<HistogramBin>) -> AmountHistogram {
        AmountHistogram { bins }
    }

    pub fn bins(&self) -> &[HistogramBin] {
        &self.bins
    }
}

impl ChartView for AmountHistogram {
    fn title(&self) -> &'static str {
        "Histogram of Expense Amounts"
    }

    fn is_empty(&self) -> bool {
        self.bins.iter().all(|bin| bin.count == 0)
    }

    fn draw(&self, area: Rect, buf: &mut Buffer) {
        let block = chart_block(self.title());
        if self.is_empty() {
            return draw_placeholder(block, area, buf);
        }

        let inner_width = area.width.saturating_sub(2);
        let bar_count = u16::try_from(self.bins.len()).unwrap_or(u16::MAX);
        let bar_width = inner_width.checked_div(bar_count).unwrap_or(0).saturating_sub(1).max(1);
        let width = self.bins.first().map(|bin| bin.upper - bin.lower).unwrap_or(1.0);

        let bars: Vec<Bar> = self
            .bins
            .iter()
            .map(|bin| {
                Bar::default()
                    .label(Line::from(bin_label(bin.lower, width)))
                    .value(bin.count)
                    .style(Style::default().fg(Color::LightBlue))
            })
            .collect();

        BarChart::default()
            .block(block.title_bottom(Line::from("amount (bin start) / frequency").alignment(Alignment::Right)))
            .bar_width(bar_width)
            .bar_gap(1)
            .data(BarGroup::default().bars(&bars))
            .render(area, buf);
    }
}

/// Dated amounts as a line, oldest first.
#[derive(Debug, Clone)]
pub struct SpendingOverTime {
    points: Vec<(NaiveDate, Decimal)>,
}

impl SpendingOverTime {
    pub fn new(points: Vec<(NaiveDate, Decimal)>) -> SpendingOverTime {
        SpendingOverTime { points }
    }

    pub fn points(&self) -> &[(NaiveDate, Decimal)] {
        &self.points
    }
}

impl ChartView for SpendingOverTime {
    fn title(&self) -> &'static str {
        "Expenses Over Time"
    }

    fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn draw(&self, area: Rect, buf: &mut Buffer) {
        let block = chart_block(self.title());
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return draw_placeholder(block, area, buf);
        };

        let data: Vec<(f64, f64)> = self
            .points
            .iter()
            .map(|(date, amount)| (day_number(*date), amount.to_f64().unwrap_or(0.0)))
            .collect();

        let (x_min, x_max) = if first.0 == last.0 {
            (day_number(first.0) - 1.0, day_number(last.0) + 1.0)
        } else {
            (day_number(first.0), day_number(last.0))
        };

        let top = data.iter().map(|(_, y)| *y).fold(0.0, f64::max);
        let y_max = if top > 0.0 { top * 1.1 } else { 1.0 };

        let datasets = vec![
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Green))
                .data(&data),
            Dataset::default()
                .marker(Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::LightGreen))
                .data(&data),
        ];

        LineChart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .title("Date")
                    .style(AXIS_STYLE)
                    .bounds([x_min, x_max])
                    .labels([x_min, (x_min + x_max) / 2.0, x_max].map(date_label)),
            )
            .y_axis(
                Axis::default()
                    .title("Amount")
                    .style(AXIS_STYLE)
                    .bounds([0.0, y_max])
                    .labels([0.0, y_max / 2.0, y_max].map(|y| format!("{y:.2}"))),
            )
            .render(area, buf);
    }
}

/// Renders a chart into an off-screen buffer and returns it as plain text,
/// one line per terminal row with trailing blanks removed.
pub fn snapshot(chart: &Chart, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    chart.draw(area, &mut buf);

    buf.content
        .chunks(usize::from(width.max(1)))
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>().trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn chart_block(title: &'static str) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(TITLE_STYLE)
        .borders(Borders::ALL)
}

fn draw_placeholder(block: Block<'static>, area: Rect, buf: &mut Buffer) {
    Paragraph::new("No expenses to chart.")
        .style(AXIS_STYLE)
        .alignment(Alignment::Center)
        .block(block)
        .render(area, buf);
}

/// Formats a bin's lower edge with enough decimals to tell neighbouring bins
/// apart.
fn bin_label(lower: f64, bin_width: f64) -> String {
    let decimals = if bin_width >= 1.0 || bin_width <= 0.0 {
        0
    } else {
        (-bin_width.log10()).ceil().min(6.0) as usize
    };

    format!("{:.*}", decimals, lower)
}

fn day_number(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn date_label(day: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(day.round() as i32)
        .map(|date| date.format(AXIS_DATE_FORMAT).to_string())
        .unwrap_or_default()
}
