use std::any::Any;

pub(crate) fn downcast<T: 'static, S: 'static>(value: S) -> Result<T, S> {
    let mut value = Some(value);
    if let Some(value) = <dyn Any>::downcast_mut::<Option<T>>(&mut value) {
        Ok(value.take().unwrap())
    } else {
        Err(value.unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::downcast;

    #[test]
    fn downcast_same_type() {
        assert_eq!(downcast::<u32, u32>(5), Ok(5));
    }

    #[test]
    fn downcast_other_type() {
        assert_eq!(downcast::<String, u32>(5), Err(5));
    }
}
