use anyhow::Result;
use candle_core::Tensor;

/// Mean of the unmasked token states, L2-normalised per row.
///
/// `hidden` is `[B, T, H]`, `attention_mask` is `[B, T]` of any dtype.
/// Rows with no unmasked token come out as zeros.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, _tokens, hidden_dim) = hidden.dims3()?;
    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    let counts = mask.sum(1)?.clamp(1f32, f32::MAX)?;
    let mean = summed.broadcast_div(&counts)?;
    let norm = (mean.sqr()?.sum_keepdim(1)?.sqrt()? + 1e-12)?;
    let pooled = mean.broadcast_div(&norm)?;
    debug_assert_eq!(pooled.dims(), &[batch, hidden_dim]);
    Ok(pooled)
}
