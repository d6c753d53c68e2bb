//! Kaiser-window smoothing for calibration channels.
//!
//! The reference channel of a scan is sampled once per raster row and carries
//! measurement jitter; conditioning it with a short Kaiser window before
//! interpolation keeps drift information while suppressing the jitter.

/// Smooth `signal` with a unit-sum Kaiser window of length `window_len`.
///
/// The signal is mirror-extended by `window_len - 1` samples on each side
/// (excluding the edge sample itself) so the window is fully supported at the
/// borders, convolved, and trimmed back to the input length. A window of 1 is
/// an identity filter. When `window_len` exceeds the signal length the mirror
/// index saturates at the far sample, so the pad repeats the terminal value
/// rather than wrapping.
pub fn kaiser_smooth(signal: &[f64], beta: f64, window_len: usize) -> Vec<f64> {
    let n = signal.len();
    if n == 0 || window_len <= 1 {
        return signal.to_vec();
    }
    let pad = window_len - 1;

    let mut padded = Vec::with_capacity(n + 2 * pad);
    for d in (1..=pad).rev() {
        padded.push(signal[d.min(n - 1)]);
    }
    padded.extend_from_slice(signal);
    for d in 1..=pad {
        padded.push(signal[n - 1 - d.min(n - 1)]);
    }

    let mut window = kaiser_window(window_len, beta);
    let total: f64 = window.iter().sum();
    for tap in &mut window {
        *tap /= total;
    }

    // Centered convolution of the padded signal, then the pad is trimmed
    // back off so the output length matches the input exactly.
    let offset = pad + (window_len - 1) / 2;
    (0..n)
        .map(|i| {
            window
                .iter()
                .enumerate()
                .map(|(j, &tap)| tap * padded[i + offset - j])
                .sum()
        })
        .collect()
}

/// Generate a symmetric Kaiser window of the given length.
///
/// `beta` trades main-lobe width against side-lobe suppression; beta = 0
/// degenerates to a rectangular window.
pub fn kaiser_window(length: usize, beta: f64) -> Vec<f64> {
    if length == 0 {
        return vec![];
    }
    if length == 1 {
        return vec![1.0];
    }

    let half = (length - 1) as f64 / 2.0;
    let i0_beta = bessel_i0(beta);

    (0..length)
        .map(|n| {
            let x = (n as f64 - half) / half;
            bessel_i0(beta * (1.0 - x * x).sqrt()) / i0_beta
        })
        .collect()
}

/// Zeroth-order modified Bessel function of the first kind.
///
/// Polynomial approximation below 3.75, asymptotic expansion above
/// (Abramowitz & Stegun 9.8.1 / 9.8.2).
fn bessel_i0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 1e-10 {
        return 1.0;
    }

    if ax < 3.75 {
        let t = (x / 3.75).powi(2);
        1.0 + t
            * (3.5156229
                + t * (3.0899424
                    + t * (1.2067492 + t * (0.2659732 + t * (0.0360768 + t * 0.0045813)))))
    } else {
        let t = 3.75 / ax;
        (ax.exp() / ax.sqrt())
            * (0.39894228
                + t * (0.01328592
                    + t * (0.00225319
                        + t * (-0.00157565
                            + t * (0.00916281
                                + t * (-0.02057706
                                    + t * (0.02635537 + t * (-0.01647633 + t * 0.00392377))))))))
    }
}
