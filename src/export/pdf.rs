use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_RATIO: f32 = 0.52;

pub struct PdfManager {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    page_refs: Vec<Ref>,

    page_w: f32,
    page_h: f32,
    margin: f32,
    row_h: f32,

    next_id: i32,
    font_id: Ref,
    bold_font_id: Ref,

    font_size: f32,
    header_font_size: f32,
    title_font_size: f32,
}

impl PdfManager {
    /// A4, portrait or landscape.
    pub fn new(landscape: bool) -> Self {
        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let font_id = Ref::new(3);
        let bold_font_id = Ref::new(4);

        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));
        pdf.type1_font(bold_font_id)
            .base_font(Name(b"Helvetica-Bold"));

        let (page_w, page_h) = if landscape {
            (842.0, 595.0)
        } else {
            (595.0, 842.0)
        };

        Self {
            pdf,
            catalog_id,
            pages_id,
            page_refs: Vec::new(),

            page_w,
            page_h,
            margin: 40.0,
            row_h: 18.0,

            next_id: 5,
            font_id,
            bold_font_id,

            font_size: 8.5,
            header_font_size: 9.0,
            title_font_size: 14.0,
        }
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    /// Register a page and write its content stream.
    fn push_page(&mut self, content: Content) {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();
        self.page_refs.push(page_id);

        {
            let mut page = self.pdf.page(page_id);
            page.parent(self.pages_id)
                .media_box(Rect::new(0.0, 0.0, self.page_w, self.page_h))
                .contents(content_id);
            page.resources()
                .fonts()
                .pair(Name(b"F1"), self.font_id)
                .pair(Name(b"F2"), self.bold_font_id);
        }

        self.pdf.stream(content_id, &content.finish());
    }

    fn draw_text(&self, content: &mut Content, font: &[u8], x: f32, y: f32, size: f32, text: &str) {
        let encoded = latin1(text);
        content.begin_text();
        content.set_font(Name(font), size);
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
        content.show(Str(&encoded));
        content.end_text();
    }

    fn fill_band(&self, content: &mut Content, y: f32, width: f32, grey: f32) {
        content.save_state();
        content.set_fill_rgb(grey, grey, grey + 0.03);
        content.rect(self.margin, y, width, self.row_h);
        content.fill_nonzero();
        content.restore_state();
    }

    fn draw_row(
        &self,
        content: &mut Content,
        y: f32,
        col_widths: &[f32],
        row: &[String],
        header: bool,
    ) {
        let (font, size): (&[u8], f32) = if header {
            (b"F2", self.header_font_size)
        } else {
            (b"F1", self.font_size)
        };

        let mut x = self.margin;
        for (i, w) in col_widths.iter().enumerate() {
            let text = row.get(i).map(String::as_str).unwrap_or("");
            let fitted = fit(text, *w - 6.0, size);
            self.draw_text(content, font, x + 3.0, y + 5.5, size, &fitted);

            content.save_state();
            content.set_stroke_rgb(0.7, 0.7, 0.7);
            content.rect(x, y, *w, self.row_h);
            content.stroke();
            content.restore_state();
            x += w;
        }
    }

    /// Width per column from content length, scaled to the printable width.
    fn compute_col_widths(&self, headers: &[&str], rows: &[Vec<String>]) -> Vec<f32> {
        let char_w = self.font_size * GLYPH_RATIO;
        let mut widths: Vec<f32> = headers
            .iter()
            .map(|h| h.chars().count() as f32 * char_w + 10.0)
            .collect();

        for row in rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                let w = (cell.chars().count() as f32 * char_w + 10.0).min(220.0);
                widths[i] = widths[i].max(w);
            }
        }

        let total: f32 = widths.iter().sum();
        let max = self.page_w - 2.0 * self.margin;
        if total > max {
            let scale = max / total;
            widths.iter_mut().for_each(|w| *w *= scale);
        }
        widths
    }

    fn rows_per_page(&self) -> usize {
        let table_top = self.page_h - self.margin - 40.0;
        let usable = table_top - self.margin - self.row_h;
        ((usable / self.row_h).floor() as usize).max(1)
    }

    /// Paginated table with title, repeated header and a
    /// "footer - Page x of y" line.
    pub fn write_table(
        &mut self,
        title: &str,
        footer: &str,
        headers: &[&str],
        rows: &[Vec<String>],
    ) {
        let col_widths = self.compute_col_widths(headers, rows);
        let table_w: f32 = col_widths.iter().sum();
        let header_row: Vec<String> = headers.iter().map(|s| s.to_string()).collect();

        let per_page = self.rows_per_page();
        let chunks: Vec<&[Vec<String>]> = if rows.is_empty() {
            vec![&[]]
        } else {
            rows.chunks(per_page).collect()
        };
        let total_pages = chunks.len();

        for (page_idx, chunk) in chunks.into_iter().enumerate() {
            let mut content = Content::new();

            self.draw_text(
                &mut content,
                b"F2",
                self.margin,
                self.page_h - self.margin,
                self.title_font_size,
                title,
            );

            let mut y = self.page_h - self.margin - 40.0;
            self.fill_band(&mut content, y, table_w, 0.82);
            self.draw_row(&mut content, y, &col_widths, &header_row, true);
            y -= self.row_h;

            if chunk.is_empty() {
                self.draw_text(
                    &mut content,
                    b"F1",
                    self.margin + 3.0,
                    y + 5.5,
                    self.font_size,
                    "No data available",
                );
            }

            for (i, row) in chunk.iter().enumerate() {
                if i % 2 == 1 {
                    self.fill_band(&mut content, y, table_w, 0.95);
                }
                self.draw_row(&mut content, y, &col_widths, row, false);
                y -= self.row_h;
            }

            let page_label = format!("{footer} - Page {} of {}", page_idx + 1, total_pages);
            self.draw_text(
                &mut content,
                b"F1",
                self.margin,
                self.margin - 20.0,
                self.font_size,
                &page_label,
            );

            self.push_page(content);
        }
    }

    pub fn save(mut self, path: &Path) -> std::io::Result<()> {
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        self.pdf
            .pages(self.pages_id)
            .count(self.page_refs.len() as i32)
            .kids(self.page_refs.iter().copied());

        let bytes = self.pdf.finish();
        let mut f = File::create(path)?;
        f.write_all(&bytes)?;
        Ok(())
    }
}

/// Type1 standard fonts only cover Latin-1; everything else prints as `?`.
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

/// Cut text so it fits `width` points at `size`.
fn fit(text: &str, width: f32, size: f32) -> String {
    let max_chars = (width / (size * GLYPH_RATIO)).floor().max(1.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(2)).collect();
    out.push_str("..");
    out
}
