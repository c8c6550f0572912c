//! Generating signature assets from handwriting fonts.

use crate::error::Error;
use crate::persist::write_all_atomic;
use docsynth_render::{BodyFont, FontFace, SignatureStyle, render_signature};
use image::ImageFormat;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

const CYRILLIC_SAMPLE: &str = "Тест";

const RU_MALE: [(&str, &str); 12] = [
    ("Александр", "Иванов"),
    ("Дмитрий", "Смирнов"),
    ("Сергей", "Кузнецов"),
    ("Андрей", "Попов"),
    ("Алексей", "Васильев"),
    ("Михаил", "Петров"),
    ("Николай", "Соколов"),
    ("Владимир", "Михайлов"),
    ("Павел", "Новиков"),
    ("Игорь", "Фёдоров"),
    ("Евгений", "Морозов"),
    ("Олег", "Волков"),
];

const RU_FEMALE: [(&str, &str); 12] = [
    ("Елена", "Иванова"),
    ("Ольга", "Смирнова"),
    ("Наталья", "Кузнецова"),
    ("Татьяна", "Попова"),
    ("Ирина", "Васильева"),
    ("Анна", "Петрова"),
    ("Мария", "Соколова"),
    ("Светлана", "Михайлова"),
    ("Екатерина", "Новикова"),
    ("Юлия", "Фёдорова"),
    ("Людмила", "Морозова"),
    ("Марина", "Волкова"),
];

const EN_FIRST: [&str; 16] = [
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Thomas", "Karen",
];

const EN_LAST: [&str; 16] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Wilson",
    "Anderson", "Taylor", "Moore", "Jackson", "Martin", "Thompson", "White",
];

/// The language signature names are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameLocale {
    /// Russian first and last names.
    Russian,
    /// English first and last names.
    English,
}

impl NameLocale {
    /// Russian if any of the fonts can draw Cyrillic, English otherwise.
    pub fn detect(fonts: &[BodyFont]) -> Self {
        let cyrillic = fonts
            .iter()
            .any(|f| f.supports(CYRILLIC_SAMPLE).unwrap_or(false));
        if cyrillic {
            Self::Russian
        } else {
            Self::English
        }
    }

    /// A random full name.
    pub fn random_name<R: Rng + ?Sized>(self, rng: &mut R) -> String {
        match self {
            Self::Russian => {
                let names = if rng.gen_bool(0.5) { &RU_MALE } else { &RU_FEMALE };
                let (first, _) = names[rng.gen_range(0..names.len())];
                let (_, last) = names[rng.gen_range(0..names.len())];
                format!("{first} {last}")
            }
            Self::English => {
                let first = EN_FIRST[rng.gen_range(0..EN_FIRST.len())];
                let last = EN_LAST[rng.gen_range(0..EN_LAST.len())];
                format!("{first} {last}")
            }
        }
    }
}

/// Load every `*.ttf` font of a directory.
///
/// Fonts that cannot be embedded are skipped with a warning.
pub fn load_fonts(dir: &Path) -> Result<Vec<BodyFont>, Error> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    paths.retain(|p| {
        p.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ttf"))
    });
    paths.sort();

    let mut fonts = Vec::with_capacity(paths.len());
    for path in &paths {
        match FontFace::open(path) {
            Ok(face) => fonts.push(BodyFont::Embedded(Arc::new(face))),
            Err(e) => log::warn!("skipping font {}: {e}", path.display()),
        }
    }

    if fonts.is_empty() {
        return Err(Error::InvalidParameter(format!(
            "no usable .ttf fonts in {}",
            dir.display()
        )));
    }

    log::debug!("loaded {} fonts from {}", fonts.len(), dir.display());
    Ok(fonts)
}

/// Render `count` signatures into `out_dir`, named by fresh identifiers.
///
/// Returns the paths of the written images.
pub fn generate_signatures(
    fonts: &[BodyFont],
    out_dir: &Path,
    count: usize,
    seed: Option<u64>,
) -> Result<Vec<PathBuf>, Error> {
    if fonts.is_empty() {
        return Err(Error::InvalidParameter("no fonts to draw signatures with".to_string()));
    }

    let locale = NameLocale::detect(fonts);
    if locale == NameLocale::English {
        log::warn!("no font can draw Cyrillic, falling back to English names");
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    std::fs::create_dir_all(out_dir)?;
    let mut written = Vec::with_capacity(count);

    for i in 1..=count {
        let name = locale.random_name(&mut rng);
        let font = fonts.choose(&mut rng).unwrap_or(&fonts[0]);
        let style = SignatureStyle::random(&mut rng);
        let image = render_signature(font, &name, &style)?;

        let mut png = Cursor::new(Vec::new());
        image.write_to(&mut png, ImageFormat::Png)?;
        let file = format!("{}.png", Uuid::new_v4().simple());
        written.extend(write_all_atomic(out_dir, &[(file, png.into_inner())])?);

        if i % 50 == 0 {
            log::info!("saved {i}/{count} signatures");
        }
    }

    log::info!("wrote {} signatures to {}", written.len(), out_dir.display());
    Ok(written)
}
