use std::cell::RefCell;
use std::rc::Rc;

use crate::error::LoadError;

use super::resource::{ResourceId, ResourceStatus};
use super::sampling::TextureSampling;

/// Decoded RGBA8 image, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl ImageData {
    /// Returns `None` when `rgba` does not hold exactly `width * height` texels.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (width > 0 && height > 0 && rgba.len() == expected).then_some(Self { width, height, rgba })
    }

    /// Single-color image. Zero sides become 1; `None` when the pixel buffer
    /// would not fit in memory.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Option<Self> {
        let (width, height) = (width.max(1), height.max(1));
        let count = (width as usize).checked_mul(height as usize)?;
        count.checked_mul(4)?;
        Some(Self { width, height, rgba: rgba.repeat(count) })
    }

    /// Decodes an encoded image (PNG, JPEG, BMP) into RGBA8.
    pub fn decode(uri: &str, bytes: &[u8]) -> Result<Self, LoadError> {
        let decoded = image::load_from_memory(bytes).map_err(|err| LoadError::Decode {
            uri: uri.to_string(),
            message: err.to_string(),
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self { width, height, rgba: rgba.into_raw() })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

/// Snapshot handed to a GPU backend when a texture needs (re)uploading.
#[derive(Debug, Clone)]
pub struct TextureUpload {
    pub id: ResourceId,
    pub image: ImageData,
    pub sampling: TextureSampling,
}

#[derive(Debug)]
struct TextureState {
    id: ResourceId,
    uri: String,
    status: ResourceStatus,
    image: Option<ImageData>,
    error: Option<String>,
    sampling: TextureSampling,
    needs_upload: bool,
    disposed: bool,
}

/// Shared handle to a texture resource.
///
/// Clones alias the same texture. Disposing releases the image and makes every
/// consumer see the texture as absent; it never invalidates the handle itself.
#[derive(Debug, Clone)]
pub struct TextureHandle(Rc<RefCell<TextureState>>);

impl TextureHandle {
    /// A texture whose image has not arrived yet.
    pub fn pending(uri: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(TextureState {
            id: ResourceId::next(),
            uri: uri.into(),
            status: ResourceStatus::Pending,
            image: None,
            error: None,
            sampling: TextureSampling::default(),
            needs_upload: false,
            disposed: false,
        })))
    }

    /// An already-resolved texture (procedural or embedded data).
    pub fn from_image(uri: impl Into<String>, image: ImageData) -> Self {
        let handle = Self::pending(uri);
        handle.resolve(Ok(image));
        handle
    }

    pub fn id(&self) -> ResourceId {
        self.0.borrow().id
    }

    pub fn uri(&self) -> String {
        self.0.borrow().uri.clone()
    }

    pub fn status(&self) -> ResourceStatus {
        self.0.borrow().status
    }

    /// Loaded and not disposed.
    pub fn is_available(&self) -> bool {
        let state = self.0.borrow();
        !state.disposed && state.status == ResourceStatus::Loaded
    }

    /// Failure message of an errored texture.
    pub fn error(&self) -> Option<String> {
        self.0.borrow().error.clone()
    }

    /// Image dimensions, once loaded.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.0.borrow().image.as_ref().map(|img| (img.width, img.height))
    }

    pub fn sampling(&self) -> TextureSampling {
        self.0.borrow().sampling
    }

    /// Edits sampling parameters in place.
    ///
    /// On a loaded texture this schedules a re-upload so sampler changes land
    /// on the GPU.
    pub fn configure(&self, f: impl FnOnce(&mut TextureSampling)) {
        let mut state = self.0.borrow_mut();
        let before = state.sampling;
        f(&mut state.sampling);
        if state.sampling.sampler_key() != before.sampler_key()
            && state.status == ResourceStatus::Loaded
            && !state.disposed
        {
            state.needs_upload = true;
        }
    }

    pub fn needs_upload(&self) -> bool {
        self.0.borrow().needs_upload
    }

    /// Takes the pending upload, clearing `needs_upload`.
    ///
    /// Returns `None` when nothing is pending; a texture is uploaded exactly
    /// once per `needs_upload` transition.
    pub fn take_upload(&self) -> Option<TextureUpload> {
        let mut state = self.0.borrow_mut();
        if !state.needs_upload || state.disposed {
            return None;
        }
        let image = state.image.clone()?;
        state.needs_upload = false;
        Some(TextureUpload {
            id: state.id,
            image,
            sampling: state.sampling,
        })
    }

    /// Releases the image. Later consumers see the texture as absent.
    pub fn dispose(&self) {
        let mut state = self.0.borrow_mut();
        if state.disposed {
            return;
        }
        state.disposed = true;
        state.image = None;
        state.needs_upload = false;
        log::debug!("texture {} ({}) disposed", state.uri, state.id);
    }

    pub fn is_disposed(&self) -> bool {
        self.0.borrow().disposed
    }

    /// Applies a load outcome.
    ///
    /// Returns `false` when the outcome was discarded: the texture is disposed
    /// or has already resolved.
    pub(crate) fn resolve(&self, outcome: Result<ImageData, &LoadError>) -> bool {
        let mut state = self.0.borrow_mut();
        if state.disposed || state.status.is_resolved() {
            return false;
        }
        match outcome {
            Ok(image) => {
                state.image = Some(image);
                state.status = ResourceStatus::Loaded;
                state.needs_upload = true;
            }
            Err(err) => {
                state.error = Some(err.to_string());
                state.status = ResourceStatus::Errored;
            }
        }
        true
    }

    /// Whether two handles alias the same texture.
    pub fn ptr_eq(&self, other: &TextureHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> ImageData {
        ImageData::new(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap()
    }

    #[test]
    fn image_data_validates_length() {
        assert!(ImageData::new(2, 2, vec![0; 16]).is_some());
        assert!(ImageData::new(2, 2, vec![0; 15]).is_none());
        assert!(ImageData::new(0, 2, vec![]).is_none());
    }

    #[test]
    fn solid_fills_and_guards_size() {
        let img = ImageData::solid(2, 0, [1, 2, 3, 4]).unwrap();
        assert_eq!((img.width(), img.height()), (2, 1));
        assert_eq!(img.rgba(), [1, 2, 3, 4, 1, 2, 3, 4]);

        assert!(ImageData::solid(u32::MAX, u32::MAX, [0; 4]).is_none());
    }

    #[test]
    fn decode_reports_uri_on_garbage() {
        let err = ImageData::decode("door.jpg", b"not an image").unwrap_err();
        assert_eq!(err.uri(), "door.jpg");
        assert!(matches!(err, LoadError::Decode { .. }));
    }

    #[test]
    fn upload_is_taken_exactly_once() {
        let tex = TextureHandle::pending("a.png");
        assert!(tex.take_upload().is_none());

        assert!(tex.resolve(Ok(checker())));
        assert_eq!(tex.status(), ResourceStatus::Loaded);
        assert!(tex.needs_upload());

        let upload = tex.take_upload().unwrap();
        assert_eq!(upload.image.width(), 2);
        assert!(!tex.needs_upload());
        assert!(tex.take_upload().is_none());
    }

    #[test]
    fn resolves_only_once() {
        let tex = TextureHandle::pending("a.png");
        assert!(tex.resolve(Err(&LoadError::Abandoned { uri: "a.png".into() })));
        assert_eq!(tex.status(), ResourceStatus::Errored);
        assert!(tex.error().is_some());

        assert!(!tex.resolve(Ok(checker())));
        assert_eq!(tex.status(), ResourceStatus::Errored);
    }

    #[test]
    fn disposed_texture_discards_late_completion() {
        let tex = TextureHandle::pending("late.png");
        let alias = tex.clone();
        tex.dispose();

        assert!(!alias.resolve(Ok(checker())));
        assert!(alias.is_disposed());
        assert!(!alias.is_available());
        assert!(alias.take_upload().is_none());
    }

    #[test]
    fn sampler_change_on_loaded_texture_reuploads() {
        let tex = TextureHandle::from_image("c.png", checker());
        tex.take_upload();

        tex.configure(|s| s.offset.x = 0.5);
        assert!(!tex.needs_upload());

        tex.configure(|s| s.mag_filter = crate::assets::FilterMode::Nearest);
        assert!(tex.needs_upload());
    }
}
