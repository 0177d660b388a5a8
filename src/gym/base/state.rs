use std::fmt::Debug;

pub trait State: Debug + Clone {
    type Data;

    fn size(&self) -> usize;

    fn data(&self) -> &Self::Data;
}
