//! 디스플레이 서피스 (캔버스 대응).
//!
//! 프레임 파이프라인이 독점 소유하며 사이클마다 전체를 다시 그린다.
//! clear / fill-rect / blit / 픽셀 읽기·쓰기와 글리프 출력을 제공한다.

use image::{imageops, Rgba, RgbaImage};

/// 불투명 검정
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// 불투명 흰색
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// 텍스트 출력 시 밝기 램프 (어두움 → 밝음)
const LUMA_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// 서피스에 그려진 글리프 한 개
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphMark {
    pub glyph: char,
    /// 글리프 중심 x
    pub x: u32,
    /// 글리프 중심 y
    pub y: u32,
    pub color: Rgba<u8>,
}

/// 파이프라인 출력 버퍼
#[derive(Debug, Clone)]
pub struct DisplaySurface {
    pixels: RgbaImage,
    glyphs: Vec<GlyphMark>,
}

impl DisplaySurface {
    /// 투명한 새 서피스
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            glyphs: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// 크기 설정 후 `fill`로 채움 (크기가 같아도 항상 내용을 지운다)
    pub fn resize(&mut self, width: u32, height: u32, fill: Rgba<u8>) {
        if self.pixels.dimensions() == (width, height) {
            self.clear(fill);
        } else {
            self.pixels = RgbaImage::from_pixel(width, height, fill);
            self.glyphs.clear();
        }
    }

    /// 전체를 한 색으로 채우고 글리프 기록 삭제
    pub fn clear(&mut self, color: Rgba<u8>) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = color;
        }
        self.glyphs.clear();
    }

    /// 사각형 채우기 (서피스 밖은 잘림)
    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgba<u8>) {
        self.fill_span(x, y, x + i64::from(width), y + i64::from(height), color);
    }

    /// 사각형 외곽선 (선은 사각형 안쪽으로 그림)
    pub fn stroke_rect(
        &mut self,
        x: i64,
        y: i64,
        width: u32,
        height: u32,
        line_width: u32,
        color: Rgba<u8>,
    ) {
        if width == 0 || height == 0 || line_width == 0 {
            return;
        }
        let lw = i64::from(line_width.min(width).min(height));
        let (x1, y1) = (x + i64::from(width), y + i64::from(height));
        self.fill_span(x, y, x1, y + lw, color);
        self.fill_span(x, y1 - lw, x1, y1, color);
        self.fill_span(x, y, x + lw, y1, color);
        self.fill_span(x1 - lw, y, x1, y1, color);
    }

    /// 이미지 복사 (서피스 밖은 잘림)
    pub fn blit(&mut self, source: &RgbaImage, x: i64, y: i64) {
        imageops::replace(&mut self.pixels, source, x, y);
    }

    /// 픽셀 읽기
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.pixels.get_pixel_checked(x, y).copied()
    }

    /// 픽셀 쓰기: 범위 밖이면 false
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) -> bool {
        match self.pixels.get_pixel_mut_checked(x, y) {
            Some(pixel) => {
                *pixel = color;
                true
            }
            None => false,
        }
    }

    /// (cx, cy)를 중심으로 글리프 출력
    ///
    /// 글리프는 텍스트 출력용으로 기록되고, 공백이 아니면
    /// 셀 크기의 1/3 정사각형 풋프린트로 래스터화된다.
    pub fn draw_glyph(&mut self, glyph: char, cx: u32, cy: u32, cell_size: u32, color: Rgba<u8>) {
        self.glyphs.push(GlyphMark {
            glyph,
            x: cx,
            y: cy,
            color,
        });
        if glyph.is_whitespace() {
            return;
        }
        let side = (cell_size / 3).max(1);
        let half = i64::from(side / 2);
        self.fill_rect(i64::from(cx) - half, i64::from(cy) - half, side, side, color);
    }

    /// 현재 사이클에 그려진 글리프
    pub fn glyphs(&self) -> &[GlyphMark] {
        &self.glyphs
    }

    /// 픽셀 버퍼
    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// 텍스트 행으로 변환
    ///
    /// 글리프가 그려졌으면 글리프를 행 단위로, 아니면
    /// `cell_size` 간격으로 샘플링한 밝기를 램프 문자로 변환한다.
    pub fn to_text_lines(&self, cell_size: u32) -> Vec<String> {
        if !self.glyphs.is_empty() {
            let mut lines: Vec<String> = Vec::new();
            let mut current_y = None;
            for mark in &self.glyphs {
                if current_y != Some(mark.y) {
                    lines.push(String::new());
                    current_y = Some(mark.y);
                }
                if let Some(line) = lines.last_mut() {
                    line.push(mark.glyph);
                }
            }
            return lines;
        }

        let step = cell_size.max(1) as usize;
        let (w, h) = self.pixels.dimensions();
        (0..h)
            .step_by(step)
            .map(|y| {
                (0..w)
                    .step_by(step)
                    .map(|x| {
                        let sx = (x + cell_size / 2).min(w - 1);
                        let sy = (y + cell_size / 2).min(h - 1);
                        luma_char(*self.pixels.get_pixel(sx, sy))
                    })
                    .collect()
            })
            .collect()
    }

    fn fill_span(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgba<u8>) {
        let (w, h) = (i64::from(self.width()), i64::from(self.height()));
        let (xs, xe) = (x0.clamp(0, w), x1.clamp(0, w));
        let (ys, ye) = (y0.clamp(0, h), y1.clamp(0, h));
        for y in ys..ye {
            for x in xs..xe {
                self.pixels.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

fn luma_char(pixel: Rgba<u8>) -> char {
    let [r, g, b, a] = pixel.0;
    let luma = (299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b)) / 1000;
    let luma = luma * u32::from(a) / 255;
    let index = luma as usize * (LUMA_RAMP.len() - 1) / 255;
    LUMA_RAMP[index]
}
