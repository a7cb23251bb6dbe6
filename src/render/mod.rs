/// Still-image and looping-video background sources.
pub mod background;
/// Per-frame overlay compositor and word wrapping.
pub mod compositor;
/// CPU raster surface on `vello_cpu` with Parley shaping.
pub mod cpu;
/// The `RasterSurface` seam and frame/text primitives.
pub mod surface;
