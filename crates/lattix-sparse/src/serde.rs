use crate::tensor::SparseTensor;

use serde::ser::SerializeStruct;
use serde::Deserialize;

/// Sparse tensors serialize their shape, coordinates and values in storage order.
/// Deserialization validates the data like [`SparseTensor::from_coords`].
impl<T, const N: usize> serde::Serialize for SparseTensor<T, N>
where
    T: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let indices: Vec<&[usize]> = self.indices().iter().map(|c| c.as_slice()).collect();
        let mut state = serializer.serialize_struct("SparseTensor", 3)?;
        state.serialize_field("shape", self.shape().as_slice())?;
        state.serialize_field("indices", &indices)?;
        state.serialize_field("values", self.values())?;
        state.end()
    }
}

impl<'de, T, const N: usize> serde::Deserialize<'de> for SparseTensor<T, N>
where
    T: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct SparseTensorData<T> {
            shape: Vec<usize>,
            indices: Vec<Vec<usize>>,
            values: Vec<T>,
        }

        let SparseTensorData {
            shape,
            indices,
            values,
        } = SparseTensorData::deserialize(deserializer)?;

        let shape: [usize; N] = shape
            .try_into()
            .map_err(|_| serde::de::Error::custom("Invalid shape"))?;

        SparseTensor::from_coords(shape, &indices, values).map_err(serde::de::Error::custom)
    }
}
