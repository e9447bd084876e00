// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use indicatif::{ProgressBar, ProgressStyle};
use sampledash_client::ProgressSink;

const STEPS: u64 = 1000;

/// Terminal progress bar fed by enrichment
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new(STEPS);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏ "),
        );
        bar.set_message(message.to_string());
        Self { bar }
    }

    /// Leave the bar where it stopped, e.g. after a failed fetch.
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl ProgressSink for BarProgress {
    fn advance(&mut self, fraction: f64) {
        let position = (fraction.clamp(0.0, 1.0) * STEPS as f64).round() as u64;
        self.bar.set_position(position);
    }

    fn finish(&mut self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hidden() -> BarProgress {
        BarProgress {
            bar: ProgressBar::hidden(),
        }
    }

    #[test]
    fn test_fraction_maps_to_position() {
        let mut progress = hidden();
        progress.advance(1.0 / 3.0);
        assert_eq!(progress.bar.position(), 333);
        progress.advance(1.0);
        assert_eq!(progress.bar.position(), STEPS);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let mut progress = hidden();
        progress.advance(1.5);
        assert_eq!(progress.bar.position(), STEPS);
        progress.advance(-0.2);
        assert_eq!(progress.bar.position(), 0);
    }
}
