use image::imageops::FilterType;
use log::debug;

/// Resampling algorithms selectable by name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResizeFilter {
    #[default]
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos,
}

impl ResizeFilter {
    pub const ALL: [ResizeFilter; 4] = [Self::Nearest, Self::Bilinear, Self::Bicubic, Self::Lanczos];

    /// Unknown names are not an error: they fall back to nearest neighbour.
    pub fn from_name(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" | "nearest_neighbor" | "nearestneighbor" => Self::Nearest,
            "bilinear" | "linear" | "triangle" => Self::Bilinear,
            "bicubic" | "cubic" | "catmullrom" | "catmull_rom" => Self::Bicubic,
            "lanczos" | "lanczos3" => Self::Lanczos,
            other => {
                debug!("unknown resize filter '{}', using nearest", other);
                Self::Nearest
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Bilinear => "bilinear",
            Self::Bicubic => "bicubic",
            Self::Lanczos => "lanczos",
        }
    }

    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Bilinear => FilterType::Triangle,
            Self::Bicubic => FilterType::CatmullRom,
            Self::Lanczos => FilterType::Lanczos3,
        }
    }
}
