//! segcam-vision 성능 벤치마크
//!
//! 실행: cargo bench -p segcam-vision
//!
//! 벤치마크 대상:
//! - 중심점 추출 (find_person_center)
//! - ASCII 그리드 래스터화 (AsciiEffect::rasterize)
//! - 크로마키 세그멘테이션 마스크 생성

use std::hint::black_box;
use std::sync::Arc;

use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{Rgba, RgbaImage};
use segcam_core::config::{ChromaKeyConfig, EffectConfig};
use segcam_core::error::CoreError;
use segcam_core::models::frame::{CategoryMask, Frame};
use segcam_core::models::surface::{DisplaySurface, BLACK};
use segcam_core::ports::segmenter::Segmenter;
use segcam_vision::chroma_key::ChromaKey;
use segcam_vision::classifier::MaskClassifier;
use segcam_vision::effects::AsciiEffect;
use segcam_vision::geometry;

/// 벤치마크에서는 추론을 호출하지 않음
struct UnusedSegmenter;

#[async_trait]
impl Segmenter for UnusedSegmenter {
    async fn initialize(&self) -> Result<(), CoreError> {
        Ok(())
    }

    async fn segment(&self, _frame: &Frame, _ts: u64) -> Result<CategoryMask, CoreError> {
        Err(CoreError::Internal("unused".into()))
    }
}

/// 가운데에 사람 블록이 있는 마스크
fn create_mask(width: u32, height: u32) -> CategoryMask {
    let mut labels = vec![0u8; (width * height) as usize];
    for y in height / 4..height * 3 / 4 {
        for x in width * 2 / 5..width * 3 / 5 {
            labels[(y * width + x) as usize] = 15;
        }
    }
    CategoryMask::from_labels(width, height, &labels).unwrap()
}

/// 크로마키 배경 위 인물 블록 이미지
fn create_frame(width: u32, height: u32) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(width, height, Rgba([0, 177, 64, 255]));
    for y in height / 4..height * 3 / 4 {
        for x in width * 2 / 5..width * 3 / 5 {
            img.put_pixel(x, y, Rgba([205, 140, 110, 255]));
        }
    }
    img
}

const RESOLUTIONS: [(u32, u32); 3] = [(640, 480), (1280, 720), (1920, 1080)];

/// 중심점 추출 벤치마크
fn bench_centroid(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_person_center");
    let classifier = MaskClassifier::default();

    for (width, height) in RESOLUTIONS {
        group.throughput(Throughput::Elements(u64::from(width * height)));
        let mask = create_mask(width, height);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, height)),
            &mask,
            |b, mask| {
                b.iter(|| black_box(geometry::find_person_center(mask, &classifier)));
            },
        );
    }

    group.finish();
}

/// ASCII 효과 벤치마크
fn bench_ascii(c: &mut Criterion) {
    let mut group = c.benchmark_group("ascii_rasterize");
    let effect = AsciiEffect::new(
        Arc::new(UnusedSegmenter),
        MaskClassifier::default(),
        &EffectConfig::default(),
    );

    for (width, height) in RESOLUTIONS {
        group.throughput(Throughput::Elements(u64::from(width * height)));
        let mask = create_mask(width, height);
        let mut surface = DisplaySurface::new(width, height);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, height)),
            &mask,
            |b, mask| {
                b.iter(|| {
                    surface.clear(BLACK);
                    effect.rasterize(mask, &mut surface);
                    black_box(surface.glyphs().len())
                });
            },
        );
    }

    group.finish();
}

/// 크로마키 판정 벤치마크
fn bench_chroma_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("chroma_key");
    let key = ChromaKey::from_config(&ChromaKeyConfig::default());

    for (width, height) in RESOLUTIONS {
        group.throughput(Throughput::Elements(u64::from(width * height)));
        let img = create_frame(width, height);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, height)),
            &img,
            |b, img| {
                b.iter(|| black_box(img.pixels().filter(|p| key.is_foreground(p)).count()));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_centroid, bench_ascii, bench_chroma_key);
criterion_main!(benches);
