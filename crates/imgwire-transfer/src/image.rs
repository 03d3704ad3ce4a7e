//! Minimal image/array object model.
//!
//! An [`Image`] is a shaped, element-homogeneous pixel store: either one
//! contiguous buffer (`Flat`) or an ordered sequence of equally-sized plane
//! buffers (`Planar`, plane = the first two extents, plane count = product
//! of the rest). The transfer engine only ever sees byte slices of these
//! buffers; the typed accessors exist for producers and consumers.

use imgwire_proto::{ElementType, Layout, TransferDescriptor};

use crate::error::{Result, TransferError};

mod sealed {
    pub trait Sealed {}
}

/// Scalar types that can populate a [`TypedBuffer`].
///
/// Closed set matching [`ElementType`]; payload bytes travel in native
/// byte order.
pub trait Element: sealed::Sealed + Copy {
    /// The wire tag for this scalar type.
    const TYPE: ElementType;

    fn append_to(self, out: &mut Vec<u8>);
    fn read_from(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($($t:ty => $tag:ident),* $(,)?) => {$(
        impl sealed::Sealed for $t {}

        impl Element for $t {
            const TYPE: ElementType = ElementType::$tag;

            fn append_to(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_ne_bytes());
            }

            fn read_from(bytes: &[u8]) -> Self {
                Self::from_ne_bytes(bytes.try_into().unwrap())
            }
        }
    )*};
}

impl_element! {
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    f32 => Float32,
    f64 => Float64,
}

/// An exclusively-owned, element-homogeneous, contiguous buffer.
///
/// Holds raw storage bytes plus the element type; the chunked engine slices
/// it into frames at byte level.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedBuffer {
    element_type: ElementType,
    data: Vec<u8>,
}

impl TypedBuffer {
    /// A zero-filled buffer for `element_count` elements.
    pub fn zeroed(element_type: ElementType, element_count: usize) -> Self {
        Self {
            element_type,
            data: vec![0u8; element_count * element_type.size_in_bytes()],
        }
    }

    /// Wrap raw storage bytes. The byte length must be a whole number of
    /// elements.
    pub fn from_bytes(element_type: ElementType, data: Vec<u8>) -> Result<Self> {
        if data.len() % element_type.size_in_bytes() != 0 {
            return Err(TransferError::ShapeMismatch(format!(
                "{} bytes is not a whole number of {} elements",
                data.len(),
                element_type.token(),
            )));
        }
        Ok(Self { element_type, data })
    }

    /// Build a buffer from typed elements.
    pub fn from_elements<T: Element>(elements: &[T]) -> Self {
        let mut data = Vec::with_capacity(elements.len() * T::TYPE.size_in_bytes());
        for &element in elements {
            element.append_to(&mut data);
        }
        Self {
            element_type: T::TYPE,
            data,
        }
    }

    /// Read the buffer back as typed elements.
    pub fn to_elements<T: Element>(&self) -> Result<Vec<T>> {
        if T::TYPE != self.element_type {
            return Err(TransferError::ShapeMismatch(format!(
                "buffer holds {}, requested {}",
                self.element_type.token(),
                T::TYPE.token(),
            )));
        }
        let size = self.element_type.size_in_bytes();
        Ok(self.data.chunks_exact(size).map(T::read_from).collect())
    }

    /// The element type of this buffer.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Number of elements stored.
    pub fn element_count(&self) -> usize {
        self.data.len() / self.element_type.size_in_bytes()
    }

    /// Total storage size in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// The raw storage bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The raw storage bytes, writable.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// Pixel storage of an image: one buffer, or ordered planes.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    /// Single contiguous buffer.
    Flat(TypedBuffer),
    /// Ordered sequence of equally-sized plane buffers.
    Planar(Vec<TypedBuffer>),
}

impl PixelData {
    /// The layout tag for this storage.
    pub fn layout(&self) -> Layout {
        match self {
            PixelData::Flat(_) => Layout::Flat,
            PixelData::Planar(_) => Layout::Planar,
        }
    }
}

/// A shaped, typed image: dimension extents plus pixel storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    dims: Vec<u64>,
    data: PixelData,
}

impl Image {
    /// Allocate a zero-filled image matching a received descriptor.
    ///
    /// Used on the receive side before any payload frame is read.
    pub fn alloc(desc: &TransferDescriptor) -> Result<Image> {
        let total = desc
            .element_count()
            .ok_or_else(|| TransferError::TooLarge(format!("extents {:?}", desc.dims)))?;
        if total == 0 {
            return Err(TransferError::EmptyImage);
        }
        let total = to_alloc_size(total, desc.element_type)?;

        let data = match desc.layout {
            Layout::Flat => PixelData::Flat(TypedBuffer::zeroed(desc.element_type, total)),
            Layout::Planar => {
                let len = desc
                    .plane_len()
                    .ok_or_else(|| TransferError::TooLarge(format!("extents {:?}", desc.dims)))?;
                let count = desc
                    .plane_count()
                    .ok_or_else(|| TransferError::TooLarge(format!("extents {:?}", desc.dims)))?;
                let len = to_alloc_size(len, desc.element_type)?;
                let count = usize::try_from(count)
                    .map_err(|_| TransferError::TooLarge(format!("{count} planes")))?;
                PixelData::Planar(
                    (0..count)
                        .map(|_| TypedBuffer::zeroed(desc.element_type, len))
                        .collect(),
                )
            }
        };

        Ok(Image {
            dims: desc.dims.clone(),
            data,
        })
    }

    /// Build an image from a single contiguous buffer.
    pub fn from_flat(dims: Vec<u64>, buffer: TypedBuffer) -> Result<Image> {
        let expected = checked_count(&dims)?;
        if buffer.element_count() as u64 != expected {
            return Err(TransferError::ShapeMismatch(format!(
                "extents {:?} declare {} elements, buffer holds {}",
                dims,
                expected,
                buffer.element_count(),
            )));
        }
        Ok(Image {
            dims,
            data: PixelData::Flat(buffer),
        })
    }

    /// Build an image from ordered plane buffers.
    pub fn from_planes(dims: Vec<u64>, planes: Vec<TypedBuffer>) -> Result<Image> {
        let desc = TransferDescriptor::new(
            dims.clone(),
            planes
                .first()
                .ok_or_else(|| TransferError::ShapeMismatch("no planes".to_string()))?
                .element_type(),
            Layout::Planar,
        );
        let plane_len = desc.plane_len().unwrap_or(0);
        let plane_count = desc.plane_count().unwrap_or(0);

        if planes.len() as u64 != plane_count {
            return Err(TransferError::ShapeMismatch(format!(
                "extents {:?} declare {} planes, got {}",
                dims,
                plane_count,
                planes.len(),
            )));
        }
        for (index, plane) in planes.iter().enumerate() {
            if plane.element_type() != desc.element_type {
                return Err(TransferError::ShapeMismatch(format!(
                    "plane {index} holds {}, expected {}",
                    plane.element_type().token(),
                    desc.element_type.token(),
                )));
            }
            if plane.element_count() as u64 != plane_len {
                return Err(TransferError::ShapeMismatch(format!(
                    "plane {index} holds {} elements, expected {plane_len}",
                    plane.element_count(),
                )));
            }
        }
        Ok(Image {
            dims,
            data: PixelData::Planar(planes),
        })
    }

    /// The descriptor announcing this image on the wire.
    pub fn descriptor(&self) -> TransferDescriptor {
        TransferDescriptor::new(self.dims.clone(), self.element_type(), self.data.layout())
    }

    /// Per-dimension extents.
    pub fn dims(&self) -> &[u64] {
        &self.dims
    }

    /// The element type of the pixel data.
    pub fn element_type(&self) -> ElementType {
        match &self.data {
            PixelData::Flat(buffer) => buffer.element_type(),
            PixelData::Planar(planes) => planes[0].element_type(),
        }
    }

    /// Total number of elements across all storage.
    pub fn element_count(&self) -> usize {
        match &self.data {
            PixelData::Flat(buffer) => buffer.element_count(),
            PixelData::Planar(planes) => planes.iter().map(TypedBuffer::element_count).sum(),
        }
    }

    /// The pixel storage.
    pub fn pixel_data(&self) -> &PixelData {
        &self.data
    }

    /// The pixel storage, writable.
    pub fn pixel_data_mut(&mut self) -> &mut PixelData {
        &mut self.data
    }
}

fn checked_count(dims: &[u64]) -> Result<u64> {
    if dims.is_empty() {
        return Err(TransferError::ShapeMismatch("no dimensions".to_string()));
    }
    dims.iter()
        .try_fold(1u64, |acc, &extent| acc.checked_mul(extent))
        .ok_or_else(|| TransferError::TooLarge(format!("extents {dims:?}")))
}

fn to_alloc_size(elements: u64, element_type: ElementType) -> Result<usize> {
    usize::try_from(elements)
        .ok()
        .and_then(|n| n.checked_mul(element_type.size_in_bytes()).map(|_| n))
        .ok_or_else(|| {
            TransferError::TooLarge(format!(
                "{elements} elements of {} bytes",
                element_type.size_in_bytes()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_construction_roundtrip() {
        let buffer = TypedBuffer::from_elements(&[1.5f32, -2.25, 0.0]);
        assert_eq!(buffer.element_type(), ElementType::Float32);
        assert_eq!(buffer.element_count(), 3);
        assert_eq!(buffer.byte_len(), 12);
        assert_eq!(buffer.to_elements::<f32>().unwrap(), vec![1.5, -2.25, 0.0]);
    }

    #[test]
    fn typed_readback_checks_element_type() {
        let buffer = TypedBuffer::from_elements(&[1i16, 2, 3]);
        assert!(matches!(
            buffer.to_elements::<f64>(),
            Err(TransferError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn from_bytes_requires_whole_elements() {
        assert!(TypedBuffer::from_bytes(ElementType::Float32, vec![0u8; 12]).is_ok());
        assert!(matches!(
            TypedBuffer::from_bytes(ElementType::Float32, vec![0u8; 13]),
            Err(TransferError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn alloc_flat_matches_descriptor() {
        let desc = TransferDescriptor::new(vec![64, 32], ElementType::UInt16, Layout::Flat);
        let image = Image::alloc(&desc).unwrap();

        assert_eq!(image.element_count(), 64 * 32);
        assert_eq!(image.descriptor(), desc);
        assert!(matches!(image.pixel_data(), PixelData::Flat(_)));
    }

    #[test]
    fn alloc_planar_slices_beyond_second_extent() {
        let desc = TransferDescriptor::new(vec![16, 8, 5, 2], ElementType::Float64, Layout::Planar);
        let image = Image::alloc(&desc).unwrap();

        match image.pixel_data() {
            PixelData::Planar(planes) => {
                assert_eq!(planes.len(), 10);
                assert!(planes.iter().all(|p| p.element_count() == 16 * 8));
            }
            PixelData::Flat(_) => panic!("expected planar storage"),
        }
        assert_eq!(image.descriptor(), desc);
    }

    #[test]
    fn alloc_rejects_empty_images() {
        let desc = TransferDescriptor::new(vec![0, 10], ElementType::UInt8, Layout::Flat);
        assert!(matches!(
            Image::alloc(&desc),
            Err(TransferError::EmptyImage)
        ));
    }

    #[test]
    fn alloc_rejects_overflowing_extents() {
        let desc = TransferDescriptor::new(vec![u64::MAX, 8], ElementType::UInt8, Layout::Flat);
        assert!(matches!(Image::alloc(&desc), Err(TransferError::TooLarge(_))));
    }

    #[test]
    fn from_flat_validates_element_count() {
        let buffer = TypedBuffer::from_elements(&[0u8; 10]);
        assert!(Image::from_flat(vec![2, 5], buffer.clone()).is_ok());
        assert!(matches!(
            Image::from_flat(vec![3, 5], buffer),
            Err(TransferError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn from_planes_validates_geometry() {
        let plane = || TypedBuffer::from_elements(&[0i16; 12]);

        let image = Image::from_planes(vec![4, 3, 2], vec![plane(), plane()]).unwrap();
        assert_eq!(image.element_count(), 24);
        assert_eq!(image.descriptor().layout, Layout::Planar);

        // Wrong plane count.
        assert!(matches!(
            Image::from_planes(vec![4, 3, 3], vec![plane(), plane()]),
            Err(TransferError::ShapeMismatch(_))
        ));

        // Wrong plane size.
        let short = TypedBuffer::from_elements(&[0i16; 11]);
        assert!(matches!(
            Image::from_planes(vec![4, 3, 2], vec![plane(), short]),
            Err(TransferError::ShapeMismatch(_))
        ));

        // Mixed element types.
        let wide = TypedBuffer::from_elements(&[0f32; 12]);
        assert!(matches!(
            Image::from_planes(vec![4, 3, 2], vec![plane(), wide]),
            Err(TransferError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn rank_one_planar_is_single_plane() {
        let image = Image::from_planes(vec![7], vec![TypedBuffer::from_elements(&[0u8; 7])]).unwrap();
        assert_eq!(image.descriptor().plane_count(), Some(1));
    }
}
