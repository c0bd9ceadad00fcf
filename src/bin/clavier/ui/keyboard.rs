//! On-screen keyboard widget
//!
//! Draws one octave as piano keys (naturals full height, sharps as short
//! keys overlapping the boundaries) and answers mouse hit-tests against
//! the same geometry. A pressed key is highlighted; the highlight follows
//! the engine's registry, so it clears the instant the key is released.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Block, Paragraph},
    Frame,
};

use clavier::notes::NOTE_TABLE;

use super::state::UiStateUpdate;

/// Table indices of the natural notes, left to right.
const NATURALS: [usize; 8] = [0, 2, 4, 5, 7, 9, 11, 12];

/// Table indices of the sharps, with the natural-key boundary each sits on
/// (sharp i sits between naturals j-1 and j).
const SHARPS: [(usize, u16); 5] = [(1, 1), (3, 2), (6, 4), (8, 5), (10, 6)];

/// Height of a sharp key as a fraction of the natural keys (numerator/denominator).
const SHARP_HEIGHT: (u16, u16) = (3, 5);

struct KeyGeometry {
    /// Index into `NOTE_TABLE`.
    index: usize,
    rect: Rect,
    sharp: bool,
}

/// Compute the key rectangles for the given area, sharps last (on top).
///
/// Returns no keys when the area cannot fit the octave at minimum width;
/// the widget simply does not draw on absurdly small terminals.
fn layout(area: Rect) -> Vec<KeyGeometry> {
    if area.width < 3 * NATURALS.len() as u16 || area.height < 2 {
        return Vec::new();
    }

    let natural_w = (area.width / NATURALS.len() as u16).max(3);
    let used_w = natural_w * NATURALS.len() as u16;
    let x0 = area.x + (area.width.saturating_sub(used_w)) / 2;

    let mut keys = Vec::with_capacity(NOTE_TABLE.len());

    for (slot, &index) in NATURALS.iter().enumerate() {
        keys.push(KeyGeometry {
            index,
            // One column of gap on the right separates adjacent naturals.
            rect: Rect::new(
                x0 + slot as u16 * natural_w,
                area.y,
                natural_w - 1,
                area.height,
            ),
            sharp: false,
        });
    }

    let sharp_w = (natural_w * 3 / 5).max(1);
    let sharp_h = (area.height * SHARP_HEIGHT.0 / SHARP_HEIGHT.1).max(1);
    for &(index, boundary) in &SHARPS {
        let center = x0 + boundary * natural_w;
        keys.push(KeyGeometry {
            index,
            rect: Rect::new(center.saturating_sub(sharp_w / 2), area.y, sharp_w, sharp_h),
            sharp: true,
        });
    }

    keys
}

/// The key under a terminal cell, if any. Sharps win where they overlap.
pub fn key_at(area: Rect, column: u16, row: u16) -> Option<char> {
    let keys = layout(area);
    keys.iter()
        .rev() // sharps were pushed last and sit on top
        .find(|k| k.rect.contains((column, row).into()))
        .map(|k| NOTE_TABLE[k.index].key)
}

/// Render the keyboard with the current pressed-key highlight.
pub fn render_keyboard(frame: &mut Frame, area: Rect, state: &UiStateUpdate) {
    for key in layout(area) {
        let pressed = state.is_pressed(key.index);
        let note = &NOTE_TABLE[key.index];

        let (bg, fg) = match (key.sharp, pressed) {
            (false, false) => (Color::Gray, Color::Black),
            (true, false) => (Color::DarkGray, Color::White),
            (_, true) => (Color::Yellow, Color::Black),
        };

        frame.render_widget(Block::default().style(Style::default().bg(bg)), key.rect);

        // Key cap label on the bottom row, note name above it if there is
        // room (sharps are usually too short for both).
        if key.rect.height >= 2 {
            let label_rect = Rect::new(
                key.rect.x,
                key.rect.y + key.rect.height - 1,
                key.rect.width,
                1,
            );
            let label = Paragraph::new(note.key.to_uppercase().to_string())
                .alignment(Alignment::Center)
                .style(Style::default().fg(fg).bg(bg));
            frame.render_widget(label, label_rect);
        }
        if key.rect.height >= 4 && !key.sharp {
            let name_rect = Rect::new(
                key.rect.x,
                key.rect.y + key.rect.height - 2,
                key.rect.width,
                1,
            );
            let name = Paragraph::new(note.name)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray).bg(bg));
            frame.render_widget(name, name_rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 64,
        height: 10,
    };

    #[test]
    fn every_note_gets_a_rect() {
        let keys = layout(AREA);
        assert_eq!(keys.len(), NOTE_TABLE.len());

        let mut indices: Vec<usize> = keys.iter().map(|k| k.index).collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..NOTE_TABLE.len()).collect::<Vec<_>>());
    }

    #[test]
    fn bottom_row_hits_naturals_only() {
        let bottom = AREA.y + AREA.height - 1;
        for key in "asdfghjk".chars() {
            let geom = layout(AREA);
            let rect = geom
                .iter()
                .find(|k| NOTE_TABLE[k.index].key == key)
                .unwrap()
                .rect;
            let hit = key_at(AREA, rect.x + rect.width / 2, bottom);
            assert_eq!(hit, Some(key));
        }
    }

    #[test]
    fn sharps_sit_on_top_of_naturals() {
        let geom = layout(AREA);
        let c_sharp = geom
            .iter()
            .find(|k| NOTE_TABLE[k.index].key == 'w')
            .unwrap()
            .rect;
        let hit = key_at(AREA, c_sharp.x + c_sharp.width / 2, c_sharp.y);
        assert_eq!(hit, Some('w'));
    }

    #[test]
    fn outside_the_keys_is_a_miss() {
        assert_eq!(key_at(AREA, AREA.width.saturating_sub(1), 0), None);
    }

    #[test]
    fn tiny_area_draws_nothing() {
        let tiny = Rect::new(0, 0, 10, 1);
        assert!(layout(tiny).is_empty());
        assert_eq!(key_at(tiny, 5, 0), None);
    }
}
