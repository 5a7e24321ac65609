use crate::view::Distribution;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::widgets::Widget;

const LABEL_WIDTH: u16 = 16;
const SUFFIX_WIDTH: u16 = 12;

/// Two horizontal bars: registered teams vs. teams in the leaderboard.
pub struct DistributionChart {
    pub distribution: Distribution,
}

impl Widget for DistributionChart {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width <= LABEL_WIDTH + SUFFIX_WIDTH {
            return;
        }
        let d = self.distribution;
        let slices = [
            ("Registered", d.registered, Color::Blue),
            ("In leaderboard", d.in_leaderboard, Color::Green),
        ];
        let bar_width = area.width - LABEL_WIDTH - SUFFIX_WIDTH;

        for (row, (label, count, color)) in slices.into_iter().enumerate() {
            let y = area.y + (row as u16) * 2;
            if y >= area.y + area.height {
                break;
            }
            let share = d.share(count);
            let filled = ((share / 100.0) * f64::from(bar_width)).round() as u16;

            buf.set_stringn(area.x, y, label, LABEL_WIDTH as usize, Style::default().fg(Color::White));
            let bar: String = "█".repeat(filled as usize) + &"░".repeat((bar_width - filled) as usize);
            buf.set_string(area.x + LABEL_WIDTH, y, bar, Style::default().fg(color));
            buf.set_stringn(
                area.x + LABEL_WIDTH + bar_width,
                y,
                format!(" {count} ({share:.0}%)"),
                SUFFIX_WIDTH as usize,
                Style::default().fg(Color::Gray),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn bars_are_proportional() {
        let area = Rect::new(0, 0, 48, 3);
        let mut buf = Buffer::empty(area);
        DistributionChart { distribution: Distribution { registered: 1, in_leaderboard: 3 } }
            .render(area, &mut buf);

        let registered = row_text(&buf, 0);
        let leaderboard = row_text(&buf, 2);
        assert!(registered.starts_with("Registered"));
        assert!(registered.contains("1 (25%)"));
        assert!(leaderboard.contains("3 (75%)"));
        assert_eq!(registered.matches('█').count(), 5);
        assert_eq!(leaderboard.matches('█').count(), 15);
    }

    #[test]
    fn empty_distribution_draws_empty_bars() {
        let area = Rect::new(0, 0, 48, 3);
        let mut buf = Buffer::empty(area);
        DistributionChart { distribution: Distribution::default() }.render(area, &mut buf);
        assert_eq!(row_text(&buf, 0).matches('█').count(), 0);
        assert!(row_text(&buf, 0).contains("0 (0%)"));
    }
}
