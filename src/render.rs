use crate::model::{Mood, PetState, Room};
use crossterm::{
    cursor, execute, queue,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

// design points per terminal cell
const PTS_PER_COL: f32 = 8.0;
const PTS_PER_ROW: f32 = 8.0;

const ROOM_TOP: u16 = 4;
const ROOM_H: u16 = 11;
const BAR_W: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
    pub(crate) bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
            bold: false,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    #[cfg(test)]
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.w && y < self.h).then(|| self.cells[self.idx(x, y)])
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            *c = Cell {
                bg,
                ..Cell::default()
            };
        }
    }
    fn fill_rows(&mut self, y0: u16, h: u16, bg: Color) {
        for y in y0..y0.saturating_add(h).min(self.h) {
            for x in 0..self.w {
                self.set(
                    x,
                    y,
                    Cell {
                        bg,
                        ..Cell::default()
                    },
                );
            }
        }
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    restored: bool,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let (cols, rows) = terminal::size()?;
        // built before any setup so a failure below still restores on drop
        let mut term = Self {
            out: io::stdout(),
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            restored: false,
        };
        execute!(
            term.out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;
        Ok(term)
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;
        let mut last_bold = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_bold != Some(c.bold) {
                    let attr = if c.bold {
                        Attribute::Bold
                    } else {
                        Attribute::NormalIntensity
                    };
                    queue!(self.out, SetAttribute(attr))?;
                    last_bold = Some(c.bold);
                    // NormalIntensity can reset colours on some terminals
                    last_fg = None;
                    last_bg = None;
                }
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.end();
    }
}

/* -----------------------------
   Palette
------------------------------ */

#[derive(Clone, Copy)]
pub(crate) struct Palette {
    color: bool,
}

impl Palette {
    pub(crate) fn new(color: bool) -> Self {
        Self { color }
    }

    fn rgb(&self, (r, g, b): (u8, u8, u8), fallback: Color) -> Color {
        if self.color {
            Color::Rgb { r, g, b }
        } else {
            fallback
        }
    }

    fn screen_bg(&self) -> Color {
        self.rgb((0xf5, 0xf0, 0xff), Color::Black)
    }
    fn ink(&self) -> Color {
        self.rgb((0x4c, 0x1d, 0x95), Color::White)
    }
    fn muted(&self) -> Color {
        self.rgb((0x9c, 0xa3, 0xaf), Color::DarkGrey)
    }
    fn coin(&self) -> Color {
        self.rgb((0x92, 0x40, 0x0e), Color::Yellow)
    }
    fn room_bg(&self, room: Room) -> Color {
        self.rgb(room.tint(), Color::Black)
    }
    fn bar_empty(&self) -> Color {
        self.rgb((0xe5, 0xe7, 0xeb), Color::DarkGrey)
    }
}

/* -----------------------------
   Screen
------------------------------ */

/// Everything the screen needs for one frame.
pub(crate) struct Frame<'a> {
    pub(crate) pet: PetState,
    pub(crate) mood: Mood,
    pub(crate) room: Room,
    pub(crate) name: &'a str,
    /// Pet offset in design points.
    pub(crate) offset: (f32, f32),
    pub(crate) scale: f32,
    pub(crate) busy: bool,
    /// Elapsed fraction of the running activity.
    pub(crate) progress: Option<f32>,
    pub(crate) notice: Option<&'a str>,
    pub(crate) help_open: bool,
}

pub(crate) fn points_to_cells((x, y): (f32, f32)) -> (i32, i32) {
    (
        (x / PTS_PER_COL).round() as i32,
        (y / PTS_PER_ROW).round() as i32,
    )
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    draw_styled(buf, x, y, s, fg, bg, false);
}

fn draw_styled(
    buf: &mut CellBuffer,
    x: u16,
    y: u16,
    s: &str,
    fg: Color,
    bg: Color,
    bold: bool,
) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg, bold });
    }
}

fn draw_text_i32(
    buf: &mut CellBuffer,
    x: i32,
    y: i32,
    s: &str,
    fg: Color,
    bg: Color,
    bold: bool,
) {
    if y < 0 || y >= buf.h as i32 {
        return;
    }
    for (i, ch) in s.chars().enumerate() {
        let xx = x + i as i32;
        if xx >= 0 && xx < buf.w as i32 {
            buf.set(xx as u16, y as u16, Cell { ch, fg, bg, bold });
        }
    }
}

fn centered_x(width: u16, s: &str) -> u16 {
    width.saturating_sub(s.chars().count() as u16) / 2
}

pub(crate) fn bar(value: u8, width: usize) -> (usize, usize) {
    let v = value.min(100) as usize;
    let fill = (v * width + 50) / 100;
    (fill, width - fill)
}

pub(crate) fn draw_screen(buf: &mut CellBuffer, f: &Frame, pal: Palette) {
    let bg = pal.screen_bg();
    let ink = pal.ink();
    buf.clear(bg);

    // header
    draw_styled(buf, 2, 0, "Moonlight", ink, bg, true);
    let badge = format!(" o {} ", f.pet.coins);
    let bx = buf.w.saturating_sub(badge.chars().count() as u16 + 2);
    draw_styled(
        buf,
        bx,
        0,
        &badge,
        pal.coin(),
        pal.room_bg(Room::Kitchen),
        true,
    );

    // room tabs
    let tabs_w: usize = Room::ALL.iter().map(|r| r.tab().len() + 3).sum();
    let mut x = (buf.w as usize).saturating_sub(tabs_w) as u16 / 2;
    for r in Room::ALL {
        let label = format!("[{}]", r.tab());
        let active = r == f.room;
        let (fg, tab_bg) = if active {
            (ink, pal.room_bg(r))
        } else {
            (pal.muted(), bg)
        };
        draw_styled(buf, x, 2, &label, fg, tab_bg, active);
        x = x.saturating_add(label.len() as u16 + 1);
    }

    draw_room(buf, f, pal);

    // status bars
    let rows = [
        ("Salute ", f.pet.health, (0xef, 0x44, 0x44), Color::Red),
        ("Fame   ", f.pet.hunger, (0xf5, 0x9e, 0x0b), Color::Yellow),
        ("Energia", f.pet.energy, (0x10, 0xb9, 0x81), Color::Green),
    ];
    let bar_y = ROOM_TOP + ROOM_H + 1;
    for (i, (name, val, rgb, fallback)) in rows.iter().enumerate() {
        let y = bar_y + i as u16;
        draw_text(buf, 2, y, name, ink, bg);
        let (fill, _) = bar(*val, BAR_W);
        let x0 = 2 + name.len() as u16 + 1;
        let full = pal.rgb(*rgb, *fallback);
        for k in 0..BAR_W {
            let (ch, fg) = if k < fill {
                ('█', full)
            } else {
                ('░', pal.bar_empty())
            };
            buf.set(x0 + k as u16, y, Cell { ch, fg, bg, bold: false });
        }
        draw_text(buf, x0 + BAR_W as u16 + 1, y, &format!("{val:>3}"), ink, bg);
    }

    // action buttons
    let busy = f.busy;
    let buttons = ["[F] Mangia", "[P] Gioca", "[S] Dormi"];
    let total: usize = buttons.iter().map(|b| b.len() + 2).sum();
    let mut x = (buf.w as usize).saturating_sub(total) as u16 / 2;
    let btn_y = bar_y + rows.len() as u16 + 1;
    for b in buttons {
        let fg = if busy { pal.muted() } else { ink };
        draw_styled(buf, x, btn_y, b, fg, bg, !busy);
        x = x.saturating_add(b.len() as u16 + 2);
    }

    if let Some(p) = f.progress {
        let w = 12;
        let done = ((p * w as f32).round() as usize).min(w);
        let track = format!("{}{}", "▰".repeat(done), "▱".repeat(w - done));
        draw_text(buf, centered_x(buf.w, &track), btn_y + 1, &track, ink, bg);
    } else if let Some(n) = f.notice {
        draw_text(buf, centered_x(buf.w, n), btn_y + 1, n, pal.coin(), bg);
    }

    let footer = "Onde Kids";
    draw_text(buf, centered_x(buf.w, footer), btn_y + 2, footer, pal.muted(), bg);

    let help = "f feed | p play | s sleep | 1-3/tab room | h help | q quit";
    draw_text(buf, 1, buf.h.saturating_sub(1), help, pal.muted(), bg);

    if f.help_open {
        draw_center_box(
            buf,
            "How to play",
            "Keep Moonlight fed, rested and happy.\n\n\
             F Mangia: costs 5 coins, +25 hunger.\n\
             P Gioca: needs 10 energy. -15 energy,\n\
             \x20  +5 health, earns 3 coins.\n\
             S Dormi: +35 energy, +10 health.\n\n\
             One thing at a time: buttons are off\n\
             while Moonlight is busy.\n\n\
             Esc or H to close help.",
            pal,
        );
    }
}

fn draw_room(buf: &mut CellBuffer, f: &Frame, pal: Palette) {
    let room_bg = pal.room_bg(f.room);
    let ink = pal.ink();
    buf.fill_rows(ROOM_TOP, ROOM_H, room_bg);
    draw_text(buf, 2, ROOM_TOP, f.room.label(), ink, room_bg);

    let (dx, dy) = points_to_cells(f.offset);
    let cx = buf.w as i32 / 2 + dx;
    let cy = (ROOM_TOP + ROOM_H / 2) as i32 + dy;

    // pulse widens the body by a column on each side
    let pad = if f.scale > 1.05 { 3 } else { 2 };
    let face = f.mood.face();
    let inner = face.chars().count() + pad * 2;
    let top = format!(" .{}. ", "-".repeat(inner));
    let mid = format!("( {}{}{} )", " ".repeat(pad), face, " ".repeat(pad));
    let bot = format!(" '{}' ", "-".repeat(inner));
    let w = top.chars().count() as i32;
    let x0 = cx - w / 2;
    for (i, line) in [top, mid, bot].iter().enumerate() {
        draw_text_i32(buf, x0, cy - 1 + i as i32, line, ink, room_bg, i == 1);
    }
    let nx = cx - f.name.chars().count() as i32 / 2;
    draw_text_i32(buf, nx, cy + 2, f.name, ink, room_bg, false);

    if let Some(text) = f.pet.activity.bubble() {
        let bubble = format!("< {text} >");
        draw_text_i32(
            buf,
            x0 + w + 1,
            cy - 2,
            &bubble,
            ink,
            pal.rgb((0xff, 0xff, 0xff), Color::Black),
            false,
        );
    }
}

pub(crate) fn draw_center_box(buf: &mut CellBuffer, title: &str, body: &str, pal: Palette) {
    let w = buf.w;
    let h = buf.h;
    let fg = pal.ink();
    let bg = pal.rgb((0xff, 0xff, 0xff), Color::Black);

    let bw = w.saturating_sub(4).min(48);
    let bh = h.saturating_sub(4).min(16);
    if bw < 4 || bh < 4 {
        return;
    }
    let x0 = (w - bw) / 2;
    let y0 = (h - bh) / 2;

    let edge = |ch| Cell {
        ch,
        fg,
        bg,
        bold: false,
    };
    for y in y0..y0 + bh {
        for x in x0..x0 + bw {
            buf.set(x, y, edge(' '));
        }
    }
    for x in x0..x0 + bw {
        buf.set(x, y0, edge('─'));
        buf.set(x, y0 + bh - 1, edge('─'));
    }
    for y in y0..y0 + bh {
        buf.set(x0, y, edge('│'));
        buf.set(x0 + bw - 1, y, edge('│'));
    }
    buf.set(x0, y0, edge('┌'));
    buf.set(x0 + bw - 1, y0, edge('┐'));
    buf.set(x0, y0 + bh - 1, edge('└'));
    buf.set(x0 + bw - 1, y0 + bh - 1, edge('┘'));

    draw_styled(buf, x0 + 2, y0 + 1, title, fg, bg, true);

    let mut yy = y0 + 3;
    for line in body.lines() {
        if yy >= y0 + bh - 1 {
            break;
        }
        draw_text(buf, x0 + 2, yy, line, fg, bg);
        yy += 1;
    }
}
