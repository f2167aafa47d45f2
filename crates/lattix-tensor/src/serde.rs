use crate::{allocator::TensorAllocator, Tensor};

use serde::ser::SerializeStruct;
use serde::Deserialize;

/// Tensors serialize their elements in row-major order together with the shape,
/// so strided tensors round-trip as standard-layout tensors.
impl<T, const N: usize, A> serde::Serialize for Tensor<T, N, A>
where
    T: serde::Serialize + Clone,
    A: TensorAllocator,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let standard = self
            .to_standard_layout()
            .map_err(serde::ser::Error::custom)?;
        let mut state = serializer.serialize_struct("Tensor", 2)?;
        state.serialize_field("data", standard.as_slice())?;
        state.serialize_field("shape", &self.shape.to_vec())?;
        state.end()
    }
}

impl<'de, T, const N: usize, A> serde::Deserialize<'de> for Tensor<T, N, A>
where
    T: serde::Deserialize<'de>,
    A: TensorAllocator + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct TensorData<T> {
            data: Vec<T>,
            shape: Vec<usize>,
        }

        let TensorData { data, shape } = TensorData::deserialize(deserializer)?;

        let shape: [usize; N] = shape
            .try_into()
            .map_err(|_| serde::de::Error::custom("Invalid shape"))?;

        Tensor::from_shape_vec(shape, data, A::default()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use crate::{CpuAllocator, Tensor};

    #[test]
    fn test_serde() -> Result<(), Box<dyn std::error::Error>> {
        let data = vec![1, 2, 3, 4, 5, 6];
        let tensor = Tensor::<u8, 2, _>::from_shape_vec([2, 3], data, CpuAllocator)?;
        let serialized = serde_json::to_string(&tensor)?;
        let deserialized: Tensor<u8, 2, CpuAllocator> = serde_json::from_str(&serialized)?;
        assert_eq!(tensor, deserialized);
        Ok(())
    }

    #[test]
    fn test_serde_invalid_shape() {
        let json = r#"{"data":[1,2,3],"shape":[2,2]}"#;
        let res = serde_json::from_str::<Tensor<u8, 2, CpuAllocator>>(json);
        assert!(res.is_err());
    }
}
